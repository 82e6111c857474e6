//! Crate-level scenario tests driving full knit cycles.

use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::callbacks::{CallbackKind, InteractiveCallbacks};
use crate::capability::{KnittingOptions, KnittingPlugin, OptionDescriptor};
use crate::error::PluginError;
use crate::lifecycle::{LifecycleState, Operation, PluginInstance};
use crate::test_support::CallbackRecorder;

/// Polls until the instance reaches `expected` or a 2s budget runs out.
fn wait_for_state<P: KnittingPlugin>(instance: &PluginInstance<P>, expected: LifecycleState) {
    for _ in 0..400 {
        if instance.state() == expected {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!(
        "timed out waiting for state '{expected}', still '{}'",
        instance.state()
    );
}

/// Minimal concrete driver: sleeps briefly per row and reports progress.
struct SleepDriver {
    rows: u32,
}

impl KnittingPlugin for SleepDriver {
    fn on_configure(
        &self,
        _options: &KnittingOptions,
        _callbacks: &InteractiveCallbacks,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_knit(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        for row in 1..=self.rows {
            thread::sleep(Duration::from_millis(1));
            callbacks.invoke(CallbackKind::Progress, &format!("knitted row {row}"))?;
        }
        Ok(())
    }

    fn on_finish(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        callbacks.invoke(CallbackKind::Progress, "knitting complete")
    }

    fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError> {
        Ok(Vec::new())
    }

    fn validate_configuration(&self, _conf: &KnittingOptions) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Driver whose `on_knit` parks until released, so tests can hold the
/// instance in the `Knitting` state deterministically.
struct ParkedDriver {
    started: mpsc::Sender<()>,
    gate: Mutex<mpsc::Receiver<()>>,
    outcome: Mutex<Option<PluginError>>,
}

impl ParkedDriver {
    fn new(outcome: Option<PluginError>) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let driver = Self {
            started: started_tx,
            gate: Mutex::new(release_rx),
            outcome: Mutex::new(outcome),
        };
        (driver, started_rx, release_tx)
    }
}

impl KnittingPlugin for ParkedDriver {
    fn on_configure(
        &self,
        _options: &KnittingOptions,
        _callbacks: &InteractiveCallbacks,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_knit(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        self.started.send(()).ok();
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv()
            .ok();
        match self
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn on_finish(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        Ok(())
    }

    fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError> {
        Ok(Vec::new())
    }

    fn validate_configuration(&self, _conf: &KnittingOptions) -> Result<(), PluginError> {
        Ok(())
    }
}

#[test]
fn full_cycle_with_a_sleeping_driver_ends_finished() {
    let recorder = CallbackRecorder::new();
    let instance = PluginInstance::with_callbacks(SleepDriver { rows: 3 }, recorder.callbacks());

    instance
        .configure(&KnittingOptions::new())
        .expect("configure");
    instance.knit().expect("knit");
    instance.finish().expect("finish");

    assert_eq!(instance.state(), LifecycleState::Finished);
    assert!(
        recorder
            .messages_of(CallbackKind::Progress)
            .contains(&"knitting complete".to_owned())
    );
}

#[test]
fn knit_returns_before_the_machine_run_completes() {
    let (driver, started, release) = ParkedDriver::new(None);
    let instance = PluginInstance::with_callbacks(driver, InteractiveCallbacks::empty());
    instance
        .configure(&KnittingOptions::new())
        .expect("configure");

    // Returns while on_knit is still parked on the gate.
    instance.knit().expect("knit");
    started.recv().expect("worker started");
    assert_eq!(instance.state(), LifecycleState::Knitting);

    instance.finish().expect("finish");
    assert_eq!(instance.state(), LifecycleState::Finished);
    release.send(()).ok();
}

#[test]
fn concurrent_knit_against_the_same_instance_is_rejected() {
    let (driver, started, release) = ParkedDriver::new(None);
    let instance = PluginInstance::with_callbacks(driver, InteractiveCallbacks::empty());
    instance
        .configure(&KnittingOptions::new())
        .expect("configure");
    instance.knit().expect("first knit");
    started.recv().expect("worker started");

    let error = instance
        .knit()
        .expect_err("second knit while the first is in flight");
    assert!(matches!(
        error,
        PluginError::InvalidTransition {
            operation: Operation::Knit,
            state: LifecycleState::Knitting,
        }
    ));
    assert_eq!(instance.state(), LifecycleState::Knitting);

    release.send(()).ok();
    instance.finish().expect("finish");
}

#[test]
fn failing_knit_worker_records_the_error_state() {
    let failure = PluginError::Validation {
        message: "yarn break".into(),
    };
    let (driver, started, release) = ParkedDriver::new(Some(failure));
    let instance = PluginInstance::with_callbacks(driver, InteractiveCallbacks::empty());
    instance
        .configure(&KnittingOptions::new())
        .expect("configure");
    instance.knit().expect("knit");
    started.recv().expect("worker started");

    release.send(()).ok();
    wait_for_state(&instance, LifecycleState::Error);

    instance
        .configure(&KnittingOptions::new())
        .expect("configure recovers from error");
    assert_eq!(instance.state(), LifecycleState::Configured);
}

#[test]
fn unimplemented_driver_cannot_even_configure() {
    let instance = PluginInstance::with_callbacks(
        crate::capability::UnimplementedPlugin,
        InteractiveCallbacks::empty(),
    );
    let error = instance
        .configure(&KnittingOptions::new())
        .expect_err("the stub rejects everything");
    assert!(matches!(error, PluginError::NotImplemented { .. }));
    assert_eq!(instance.state(), LifecycleState::Activated);
}

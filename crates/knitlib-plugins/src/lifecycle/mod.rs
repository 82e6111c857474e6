//! Lifecycle controller enforcing legal operation sequencing for a driver.
//!
//! A [`PluginInstance`] owns the driver, its current [`LifecycleState`], and
//! its interactive callback map. Each lifecycle operation resolves a row of
//! the fixed [`TRANSITIONS`] table under the state lock, commits the
//! destination state, and then — strictly outside the lock — dispatches the
//! bound capability hook. An operation with no matching row fails with
//! [`PluginError::InvalidTransition`] and leaves the state unchanged.
//!
//! `knit` is special: the `on_knit` hook may block for the duration of a
//! physical machine run, so it is launched on a dedicated worker thread and
//! `knit()` returns as soon as the transition and the launch are recorded.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::callbacks::InteractiveCallbacks;
use crate::capability::{KnittingOptions, KnittingPlugin};
use crate::error::PluginError;


// ---------------------------------------------------------------------------
// States and operations
// ---------------------------------------------------------------------------

/// The state of a plugin instance within its lifecycle.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Freshly constructed; not yet configured.
    #[default]
    Activated,
    /// Options accepted; ready to knit.
    Configured,
    /// A knit worker is (or may still be) running.
    Knitting,
    /// The knit cycle completed normally.
    Finished,
    /// The knit cycle ended abnormally.
    Error,
}

impl LifecycleState {
    /// Returns the canonical snake_case name for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activated => "activated",
            Self::Configured => "configured",
            Self::Knitting => "knitting",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle operation a host or driver can request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Accept options and become ready to knit.
    Configure,
    /// Launch the knit worker.
    Knit,
    /// Record a normal end of the knit cycle.
    Finish,
    /// Record an abnormal end of the knit cycle.
    Fail,
}

impl Operation {
    /// Returns the canonical snake_case name for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Knit => "knit",
            Self::Finish => "finish",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    operation: Operation,
    source: LifecycleState,
    destination: LifecycleState,
}

impl Transition {
    const fn new(operation: Operation, source: LifecycleState, destination: LifecycleState) -> Self {
        Self {
            operation,
            source,
            destination,
        }
    }

    /// Returns the operation this row applies to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the state this row applies from.
    #[must_use]
    pub const fn source(&self) -> LifecycleState {
        self.source
    }

    /// Returns the state this row leads to.
    #[must_use]
    pub const fn destination(&self) -> LifecycleState {
        self.destination
    }
}

/// The complete set of legal state changes.
///
/// Immutable process-wide configuration; every observed state change of a
/// [`PluginInstance`] corresponds to exactly one row.
pub const TRANSITIONS: [Transition; 7] = [
    Transition::new(
        Operation::Configure,
        LifecycleState::Activated,
        LifecycleState::Configured,
    ),
    Transition::new(
        Operation::Configure,
        LifecycleState::Configured,
        LifecycleState::Configured,
    ),
    Transition::new(
        Operation::Configure,
        LifecycleState::Finished,
        LifecycleState::Configured,
    ),
    Transition::new(
        Operation::Configure,
        LifecycleState::Error,
        LifecycleState::Configured,
    ),
    Transition::new(
        Operation::Knit,
        LifecycleState::Configured,
        LifecycleState::Knitting,
    ),
    Transition::new(
        Operation::Finish,
        LifecycleState::Knitting,
        LifecycleState::Finished,
    ),
    Transition::new(
        Operation::Fail,
        LifecycleState::Knitting,
        LifecycleState::Error,
    ),
];

/// Looks up the destination state for `(operation, source)`.
#[must_use]
pub fn destination_for(operation: Operation, source: LifecycleState) -> Option<LifecycleState> {
    TRANSITIONS
        .iter()
        .find(|row| row.operation == operation && row.source == source)
        .map(Transition::destination)
}

// ---------------------------------------------------------------------------
// PluginInstance
// ---------------------------------------------------------------------------

struct Inner<P> {
    plugin: P,
    state: Mutex<LifecycleState>,
    callbacks: Mutex<InteractiveCallbacks>,
}

/// A driver together with its lifecycle state and callback map.
///
/// Instances are cheap-clone handles over shared state, so the knit worker
/// and the host can both drive the same lifecycle. All lifecycle operations
/// against one instance are serialised: the table lookup and state update
/// happen atomically under an internal lock, and hooks (which may invoke
/// blocking interactive callbacks) run strictly outside it.
///
/// # Example
///
/// ```
/// use knitlib_plugins::{
///     InteractiveCallbacks, LifecycleState, PluginInstance, UnimplementedPlugin,
/// };
///
/// let instance = PluginInstance::with_callbacks(
///     UnimplementedPlugin,
///     InteractiveCallbacks::empty(),
/// );
/// assert_eq!(instance.state(), LifecycleState::Activated);
/// // knit is not legal before configure succeeds.
/// assert!(instance.knit().is_err());
/// assert_eq!(instance.state(), LifecycleState::Activated);
/// ```
pub struct PluginInstance<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for PluginInstance<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for PluginInstance<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

impl<P> PluginInstance<P> {
    // State writes are plain assignments, so a panic in another holder
    // cannot leave the value torn; recover from poisoning instead of
    // propagating it.
    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callbacks(&self) -> MutexGuard<'_, InteractiveCallbacks> {
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    /// Returns a reference to the wrapped driver.
    #[must_use]
    pub fn plugin(&self) -> &P {
        &self.inner.plugin
    }

    /// Replaces the interactive callback map wholesale.
    ///
    /// `None` resets the map to empty, not to the defaults; `Some` installs
    /// exactly the supplied map. Kinds absent from the new map can no longer
    /// be invoked — registration never merges with prior contents.
    pub fn register_callbacks(&self, callbacks: Option<InteractiveCallbacks>) {
        *self.lock_callbacks() = callbacks.unwrap_or_default();
    }

    /// Returns a snapshot of the current callback map.
    ///
    /// Handlers are shared, so the snapshot is cheap and stays valid even if
    /// the map is replaced afterwards.
    #[must_use]
    pub fn callbacks(&self) -> InteractiveCallbacks {
        self.lock_callbacks().clone()
    }
}

impl<P: KnittingPlugin> PluginInstance<P> {
    /// Creates an instance in the `Activated` state with the default
    /// interactive callbacks installed.
    #[must_use]
    pub fn new(plugin: P) -> Self {
        Self::with_callbacks(plugin, InteractiveCallbacks::defaults())
    }

    /// Creates an instance in the `Activated` state with an explicit
    /// callback map.
    #[must_use]
    pub fn with_callbacks(plugin: P, callbacks: InteractiveCallbacks) -> Self {
        Self {
            inner: Arc::new(Inner {
                plugin,
                state: Mutex::new(LifecycleState::Activated),
                callbacks: Mutex::new(callbacks),
            }),
        }
    }

    /// Resolves and commits the transition for `operation` atomically.
    fn transition(&self, operation: Operation) -> Result<LifecycleState, PluginError> {
        let mut state = self.lock_state();
        let destination = destination_for(operation, *state).ok_or(
            PluginError::InvalidTransition {
                operation,
                state: *state,
            },
        )?;
        tracing::debug!(%operation, from = %*state, to = %destination, "lifecycle transition");
        *state = destination;
        Ok(destination)
    }

    /// Accepts `options` and moves the instance to `Configured`.
    ///
    /// The driver's `validate_configuration` gates the transition: a
    /// rejection leaves the state untouched. On success the state is
    /// committed first and `on_configure` then observes the post-transition
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidTransition`] when `configure` is not
    /// legal from the current state, [`PluginError::Validation`] when the
    /// driver rejects `options`, or any error raised by `on_configure`.
    pub fn configure(&self, options: &KnittingOptions) -> Result<(), PluginError> {
        {
            let mut state = self.lock_state();
            let destination = destination_for(Operation::Configure, *state).ok_or(
                PluginError::InvalidTransition {
                    operation: Operation::Configure,
                    state: *state,
                },
            )?;
            self.inner.plugin.validate_configuration(options)?;
            tracing::debug!(
                operation = %Operation::Configure,
                from = %*state,
                to = %destination,
                "lifecycle transition"
            );
            *state = destination;
        }
        let callbacks = self.callbacks();
        self.inner.plugin.on_configure(options, &callbacks)
    }

    /// Records a normal end of the knit cycle and invokes `on_finish`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidTransition`] unless the instance is
    /// `Knitting`, or any error raised by `on_finish`.
    pub fn finish(&self) -> Result<(), PluginError> {
        self.transition(Operation::Finish)?;
        let callbacks = self.callbacks();
        self.inner.plugin.on_finish(&callbacks)
    }

    /// Records an abnormal end of the knit cycle.
    ///
    /// A pure state transition with no bound hook, typically called from
    /// within a failing `on_knit`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidTransition`] unless the instance is
    /// `Knitting`.
    pub fn fail(&self) -> Result<(), PluginError> {
        self.transition(Operation::Fail)?;
        Ok(())
    }
}

impl<P: KnittingPlugin + Send + Sync + 'static> PluginInstance<P> {
    /// Moves the instance to `Knitting` and launches `on_knit` on a worker
    /// thread.
    ///
    /// Returns once the transition and the launch are recorded, not once
    /// physical knitting finishes. The worker logs and records a `fail()`
    /// when `on_knit` errors; on success, closing the cycle with
    /// [`finish`](Self::finish) is left to the driver or host.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidTransition`] unless the instance is
    /// `Configured`, or [`PluginError::WorkerSpawn`] when the worker thread
    /// cannot be created (the transition is rolled back).
    pub fn knit(&self) -> Result<(), PluginError> {
        self.transition(Operation::Knit)?;
        let worker = self.clone();
        let spawned = thread::Builder::new()
            .name("knit-worker".into())
            .spawn(move || worker.run_knit_worker());
        match spawned {
            Ok(_handle) => Ok(()),
            Err(source) => {
                *self.lock_state() = LifecycleState::Configured;
                Err(PluginError::WorkerSpawn {
                    source: Arc::new(source),
                })
            }
        }
    }

    fn run_knit_worker(&self) {
        let callbacks = self.callbacks();
        if let Err(error) = self.inner.plugin.on_knit(&callbacks) {
            tracing::error!(%error, "knit hook failed");
            if let Err(fail_error) = self.fail() {
                tracing::warn!(%fail_error, "could not record knit failure");
            }
        }
    }
}

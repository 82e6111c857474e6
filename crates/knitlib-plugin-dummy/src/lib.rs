//! Sample knitting driver emulating a machine run without hardware.
//!
//! [`DummyKnittingPlugin`] implements the full capability contract against
//! no machine at all: its knit loop sleeps per row and reports progress
//! through the interactive callbacks. It exists as living documentation of
//! the contract and as the driver used by integration tests; it is not part
//! of the contract itself.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use knitlib_plugins::{
    CallbackKind, InteractiveCallbacks, KnittingOptions, KnittingPlugin, OptionDescriptor,
    OptionDomain, PluginError,
};


/// Delay per emulated row unless overridden.
const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(250);

/// The single option the dummy driver publishes.
const ROWS_OPTION: &str = "rows";

/// Emulation driver: sleeps through a configurable number of rows.
///
/// # Example
///
/// ```
/// use knitlib_plugin_dummy::DummyKnittingPlugin;
/// use knitlib_plugins::{KnittingOptions, LifecycleState, PluginInstance};
/// use std::time::Duration;
///
/// let driver = DummyKnittingPlugin::new(2).with_row_delay(Duration::from_millis(1));
/// // Default callbacks log progress; only the blocking kinds prompt.
/// let instance = PluginInstance::new(driver);
/// instance.configure(&KnittingOptions::new()).unwrap();
/// instance.knit().unwrap();
/// instance.finish().unwrap();
/// assert_eq!(instance.state(), LifecycleState::Finished);
/// ```
#[derive(Debug)]
pub struct DummyKnittingPlugin {
    default_rows: u32,
    row_delay: Duration,
    applied: Mutex<Option<KnittingOptions>>,
}

impl Default for DummyKnittingPlugin {
    fn default() -> Self {
        Self::new(5)
    }
}

impl DummyKnittingPlugin {
    /// Creates a driver that emulates `default_rows` rows unless configured
    /// otherwise.
    #[must_use]
    pub fn new(default_rows: u32) -> Self {
        Self {
            default_rows,
            row_delay: DEFAULT_ROW_DELAY,
            applied: Mutex::new(None),
        }
    }

    /// Overrides the per-row delay; tests use a very short one.
    #[must_use]
    pub const fn with_row_delay(mut self, row_delay: Duration) -> Self {
        self.row_delay = row_delay;
        self
    }

    /// Returns the options accepted by the last `configure`, if any.
    #[must_use]
    pub fn applied_options(&self) -> Option<KnittingOptions> {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of rows the next knit run will emulate.
    fn effective_rows(&self) -> u32 {
        self.applied_options()
            .and_then(|options| options.get(ROWS_OPTION).and_then(serde_json::Value::as_u64))
            .map_or(self.default_rows, |rows| {
                u32::try_from(rows).unwrap_or(u32::MAX)
            })
    }
}

impl KnittingPlugin for DummyKnittingPlugin {
    fn on_configure(
        &self,
        options: &KnittingOptions,
        _callbacks: &InteractiveCallbacks,
    ) -> Result<(), PluginError> {
        tracing::debug!("on_configure has been called on the dummy knitting plugin");
        *self.applied.lock().unwrap_or_else(PoisonError::into_inner) = Some(options.clone());
        Ok(())
    }

    fn on_knit(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        tracing::debug!("on_knit has been called on the dummy knitting plugin");
        let rows = self.effective_rows();
        for row in 1..=rows {
            // Sleeping stands in for the blocking machine run.
            thread::sleep(self.row_delay);
            callbacks.invoke(CallbackKind::Progress, &format!("knitted row {row} of {rows}"))?;
        }
        Ok(())
    }

    fn on_finish(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        tracing::debug!("on_finish has been called on the dummy knitting plugin");
        *self.applied.lock().unwrap_or_else(PoisonError::into_inner) = None;
        callbacks.invoke(CallbackKind::Progress, "knitting complete")
    }

    fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError> {
        Ok(vec![OptionDescriptor::new(
            ROWS_OPTION,
            "Number of rows to emulate",
            OptionDomain::Integer {
                min: 1,
                max: i64::from(u32::MAX),
            },
        )])
    }

    fn validate_configuration(&self, conf: &KnittingOptions) -> Result<(), PluginError> {
        let Some(value) = conf.get(ROWS_OPTION) else {
            return Ok(());
        };
        match value.as_u64() {
            Some(rows) if rows >= 1 => Ok(()),
            _ => Err(PluginError::Validation {
                message: format!("'{ROWS_OPTION}' must be a positive integer, got {value}"),
            }),
        }
    }
}

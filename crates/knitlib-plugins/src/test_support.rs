//! Shared helpers for exercising drivers in tests.
//!
//! Enabled by the `test-support` feature so downstream driver crates can
//! reuse the same doubles in their own test suites.

use std::sync::{Arc, Mutex, PoisonError};

use crate::callbacks::{CallbackKind, InteractiveCallbacks};

/// Records every interactive message a driver emits instead of prompting.
///
/// # Example
///
/// ```
/// use knitlib_plugins::test_support::CallbackRecorder;
/// use knitlib_plugins::CallbackKind;
///
/// let recorder = CallbackRecorder::new();
/// let callbacks = recorder.callbacks();
/// callbacks.invoke(CallbackKind::Progress, "row 1 of 2").unwrap();
/// assert_eq!(recorder.messages_of(CallbackKind::Progress), ["row 1 of 2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    log: Arc<Mutex<Vec<(CallbackKind, String)>>>,
}

impl CallbackRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a callback map covering all five kinds; every handler is
    /// non-blocking and appends to this recorder.
    #[must_use]
    pub fn callbacks(&self) -> InteractiveCallbacks {
        let mut map = InteractiveCallbacks::empty();
        for kind in CallbackKind::ALL {
            let log = Arc::clone(&self.log);
            map.insert(
                kind,
                Arc::new(move |message: &str| {
                    log.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((kind, message.to_owned()));
                }),
            );
        }
        map
    }

    /// Returns every recorded `(kind, message)` pair in invocation order.
    #[must_use]
    pub fn messages(&self) -> Vec<(CallbackKind, String)> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the messages recorded for one kind, in invocation order.
    #[must_use]
    pub fn messages_of(&self, kind: CallbackKind) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(recorded, _)| *recorded == kind)
            .map(|(_, message)| message)
            .collect()
    }
}

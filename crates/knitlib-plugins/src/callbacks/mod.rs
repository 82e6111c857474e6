//! Interactive callback registry for human-in-the-loop notifications.
//!
//! Drivers surface situations that need an operator — acknowledge a warning,
//! perform a physical action, observe progress — by invoking a callback of a
//! given [`CallbackKind`] on the [`InteractiveCallbacks`] map owned by their
//! [`PluginInstance`](crate::lifecycle::PluginInstance). Host applications
//! replace the map wholesale to route those messages into their own UI; the
//! defaults log through `tracing` and, for the blocking kinds, wait for a
//! newline on standard input as the acknowledgment.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use crate::error::PluginError;


/// The kinds of human interaction a driver can request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    /// An informational message requiring acknowledgment.
    Info,
    /// A warning requiring acknowledgment.
    Warning,
    /// An error report requiring acknowledgment.
    Error,
    /// A progress report; never blocks.
    Progress,
    /// A request for a physical operator action (set needles, move knob,
    /// flip switch) requiring acknowledgment once done.
    UserAction,
}

impl CallbackKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Progress,
        Self::UserAction,
    ];

    /// Returns the canonical snake_case name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Progress => "progress",
            Self::UserAction => "user_action",
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler for one kind of interactive message.
///
/// Handlers receive the message text and may block until the operator has
/// acted on it. They are shared (`Arc`) so a callback map can be cloned
/// cheaply into the knit worker.
pub type InteractiveCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Mapping from [`CallbackKind`] to its handler.
///
/// Registration replaces the whole map; there is no partial merge. A kind
/// absent from the map makes [`InteractiveCallbacks::invoke`] fail with
/// [`PluginError::MissingCallback`] rather than silently doing nothing.
#[derive(Clone, Default)]
pub struct InteractiveCallbacks {
    entries: HashMap<CallbackKind, InteractiveCallback>,
}

impl InteractiveCallbacks {
    /// Creates a map with no handlers registered.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a map with the default handlers for all five kinds.
    ///
    /// `info`, `warning`, and `user_action` log at info level and block
    /// awaiting acknowledgment; `error` logs at error level and blocks;
    /// `progress` logs at info level without blocking.
    #[must_use]
    pub fn defaults() -> Self {
        let mut map = Self::empty();
        let ack_info: InteractiveCallback = Arc::new(interactive_info);
        map.insert(CallbackKind::Info, Arc::clone(&ack_info));
        map.insert(CallbackKind::UserAction, ack_info);
        map.insert(CallbackKind::Warning, Arc::new(interactive_warn));
        map.insert(CallbackKind::Error, Arc::new(interactive_error));
        map.insert(CallbackKind::Progress, Arc::new(log_progress));
        map
    }

    /// Registers or replaces the handler for one kind.
    pub fn insert(&mut self, kind: CallbackKind, callback: InteractiveCallback) {
        self.entries.insert(kind, callback);
    }

    /// Invokes the handler registered for `kind` with `message`.
    ///
    /// Blocking handlers do not return until the operator has acknowledged
    /// the message, so this must never be called while holding the lock
    /// that serialises lifecycle transitions.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCallback`] when no handler is
    /// registered for `kind`.
    pub fn invoke(&self, kind: CallbackKind, message: &str) -> Result<(), PluginError> {
        let callback = self
            .entries
            .get(&kind)
            .ok_or(PluginError::MissingCallback { kind })?;
        callback(message);
        Ok(())
    }

    /// Returns `true` when a handler is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: CallbackKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for InteractiveCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<CallbackKind> = self.entries.keys().copied().collect();
        kinds.sort();
        f.debug_struct("InteractiveCallbacks")
            .field("kinds", &kinds)
            .finish()
    }
}

/// Blocks until the operator sends a newline on standard input.
fn await_acknowledgment() {
    let mut line = String::new();
    if let Err(error) = std::io::stdin().lock().read_line(&mut line) {
        tracing::warn!(%error, "failed to read acknowledgment from stdin");
    }
}

fn interactive_info(message: &str) {
    tracing::info!(%message, "awaiting operator acknowledgment");
    await_acknowledgment();
}

fn interactive_warn(message: &str) {
    tracing::info!(%message, "awaiting operator acknowledgment of warning");
    await_acknowledgment();
}

fn interactive_error(message: &str) {
    tracing::error!(%message, "awaiting operator acknowledgment of error");
    await_acknowledgment();
}

fn log_progress(message: &str) {
    tracing::info!(%message, "knitting progress");
}

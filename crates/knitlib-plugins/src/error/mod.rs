//! Domain errors raised by plugin lifecycle operations.
//!
//! All errors use `thiserror`-derived enums with structured context so hosts
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::sync::Arc;

use thiserror::Error;

use crate::callbacks::CallbackKind;
use crate::capability::Hook;
use crate::lifecycle::{LifecycleState, Operation};

/// Errors arising from plugin lifecycle operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A hook was invoked on a variant that does not implement it.
    ///
    /// Raised by discoverability stubs such as
    /// [`UnimplementedPlugin`](crate::capability::UnimplementedPlugin); the
    /// message explains what the missing hook is for.
    #[error("hook '{hook}' is not implemented; {}", .hook.purpose())]
    NotImplemented {
        /// The hook that was invoked.
        hook: Hook,
    },

    /// An operation was requested from a state with no matching transition.
    ///
    /// The instance state is left unchanged when this is returned.
    #[error("operation '{operation}' is not legal from state '{state}'")]
    InvalidTransition {
        /// The operation that was attempted.
        operation: Operation,
        /// The state the instance was in at the time.
        state: LifecycleState,
    },

    /// A candidate configuration was rejected by the driver.
    ///
    /// `configure` does not transition state when this is returned.
    #[error("configuration rejected: {message}")]
    Validation {
        /// Human-readable description of the rejected option.
        message: String,
    },

    /// An interactive callback of the requested kind is absent from the
    /// current callback map.
    #[error("no interactive callback registered for kind '{kind}'")]
    MissingCallback {
        /// The kind that was looked up.
        kind: CallbackKind,
    },

    /// The knit worker thread could not be spawned.
    #[error("failed to spawn knit worker: {source}")]
    WorkerSpawn {
        /// Underlying I/O error from the thread builder.
        #[source]
        source: Arc<std::io::Error>,
    },
}

#[cfg(test)]
mod tests;

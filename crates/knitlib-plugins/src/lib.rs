//! Plugin lifecycle framework for knitting-machine drivers.
//!
//! A driver for a physical knitting machine advances through a fixed cycle —
//! configure, knit, finish — with an error path for abnormal ends. This crate
//! provides the three pieces that make that cycle safe to drive from a host
//! application:
//!
//! - the [`KnittingPlugin`] capability contract every concrete driver
//!   implements (`on_configure`, `on_knit`, `on_finish`, `publish_options`,
//!   `validate_configuration`);
//! - the [`PluginInstance`] lifecycle controller, a finite-state machine over
//!   the immutable [`TRANSITIONS`] table that rejects illegal operations with
//!   a typed error and dispatches the bound hook on each legal one;
//! - the [`InteractiveCallbacks`] registry for human-in-the-loop messages
//!   (acknowledge a warning, perform a physical action, observe progress).
//!
//! The `knit` operation launches its hook on a dedicated worker thread: the
//! caller returns as soon as the transition is recorded, while the machine
//! run — the only part of the contract allowed to block indefinitely —
//! proceeds in the background and closes the cycle through `finish()` or
//! `fail()`.
//!
//! # Example
//!
//! ```
//! use knitlib_plugins::{
//!     InteractiveCallbacks, KnittingOptions, KnittingPlugin, LifecycleState,
//!     OptionDescriptor, PluginError, PluginInstance,
//! };
//!
//! struct SilentDriver;
//!
//! impl KnittingPlugin for SilentDriver {
//!     fn on_configure(
//!         &self,
//!         _options: &KnittingOptions,
//!         _callbacks: &InteractiveCallbacks,
//!     ) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//!     fn on_knit(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//!     fn on_finish(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//!     fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError> {
//!         Ok(Vec::new())
//!     }
//!     fn validate_configuration(&self, _conf: &KnittingOptions) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//! }
//!
//! let instance = PluginInstance::with_callbacks(SilentDriver, InteractiveCallbacks::empty());
//! instance.configure(&KnittingOptions::new()).unwrap();
//! instance.knit().unwrap();
//! instance.finish().unwrap();
//! assert_eq!(instance.state(), LifecycleState::Finished);
//! ```

pub mod callbacks;
pub mod capability;
pub mod error;
pub mod lifecycle;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod tests;

pub use self::callbacks::{CallbackKind, InteractiveCallback, InteractiveCallbacks};
pub use self::capability::{
    Hook, KnittingOptions, KnittingPlugin, OptionDescriptor, OptionDomain, UnimplementedPlugin,
};
pub use self::error::PluginError;
pub use self::lifecycle::{LifecycleState, Operation, PluginInstance, TRANSITIONS, Transition};

//! Capability contract implemented by concrete knitting-machine drivers.
//!
//! The [`KnittingPlugin`] trait is the full set of hooks the lifecycle
//! controller dispatches into. The compiler forces every concrete driver to
//! implement all five; [`UnimplementedPlugin`] exists so the contract is
//! discoverable at runtime too, each of its hooks failing with a
//! [`PluginError::NotImplemented`] that explains what the hook is for.
//!
//! Timing contract: `on_configure`, `on_finish`, `publish_options`, and
//! `validate_configuration` must return promptly and must not perform
//! blocking hardware I/O. `on_knit` is the only hook permitted to block
//! indefinitely; the controller runs it on a dedicated worker thread.

use std::fmt;

use crate::callbacks::InteractiveCallbacks;
use crate::error::PluginError;

#[cfg(test)]
mod tests;

/// Options document accepted by `configure`, keyed by option name.
///
/// The shape of individual values is driver-specific; drivers describe the
/// acceptable domains through [`KnittingPlugin::publish_options`].
pub type KnittingOptions = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Hook
// ---------------------------------------------------------------------------

/// Identifies one hook of the capability contract.
///
/// Used by [`PluginError::NotImplemented`] so a missing hook names itself
/// and its reason for existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// The `on_configure` hook.
    OnConfigure,
    /// The `on_knit` hook.
    OnKnit,
    /// The `on_finish` hook.
    OnFinish,
    /// The `publish_options` hook.
    PublishOptions,
    /// The `validate_configuration` hook.
    ValidateConfiguration,
}

impl Hook {
    /// Returns the canonical snake_case name for this hook.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnConfigure => "on_configure",
            Self::OnKnit => "on_knit",
            Self::OnFinish => "on_finish",
            Self::PublishOptions => "publish_options",
            Self::ValidateConfiguration => "validate_configuration",
        }
    }

    /// Explains why the hook exists, for use in `NotImplemented` errors.
    #[must_use]
    pub const fn purpose(self) -> &'static str {
        match self {
            Self::OnConfigure => "it applies accepted options before knitting starts",
            Self::OnKnit => "it runs the main knitting loop and is the only hook allowed to block",
            Self::OnFinish => {
                "it is called when knitting is over so the driver can be configured again"
            }
            Self::PublishOptions => "it exposes the configurable options and their valid domains",
            Self::ValidateConfiguration => "it verifies that a candidate configuration is valid",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Option descriptors
// ---------------------------------------------------------------------------

/// The domain of valid values for one configurable option.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionDomain {
    /// True or false.
    Boolean,
    /// An integer within an inclusive range.
    Integer {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// Free-form text.
    Text,
    /// One of a fixed set of values.
    Choice {
        /// The accepted values.
        values: Vec<String>,
    },
}

/// Describes one option a host can supply to `configure`.
///
/// # Example
///
/// ```
/// use knitlib_plugins::capability::{OptionDescriptor, OptionDomain};
///
/// let descriptor = OptionDescriptor::new(
///     "rows",
///     "Number of rows to knit",
///     OptionDomain::Integer { min: 1, max: 10_000 },
/// );
/// assert_eq!(descriptor.name(), "rows");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionDescriptor {
    name: String,
    description: String,
    domain: OptionDomain,
}

impl OptionDescriptor {
    /// Creates a descriptor for one option.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        domain: OptionDomain,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            domain,
        }
    }

    /// Returns the option name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the domain of valid values.
    #[must_use]
    pub const fn domain(&self) -> &OptionDomain {
        &self.domain
    }
}

// ---------------------------------------------------------------------------
// KnittingPlugin
// ---------------------------------------------------------------------------

/// The set of hooks every concrete knitting-machine driver must supply.
///
/// The lifecycle hooks receive the instance's current interactive callback
/// map so they can surface messages needing a human response;
/// `publish_options` and `validate_configuration` are pure and receive
/// nothing but their inputs.
pub trait KnittingPlugin {
    /// Validates and applies accepted options; on success the driver is
    /// ready to knit. Must not perform blocking hardware I/O.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Validation`] when an option cannot be applied.
    fn on_configure(
        &self,
        options: &KnittingOptions,
        callbacks: &InteractiveCallbacks,
    ) -> Result<(), PluginError>;

    /// Performs the physical knitting operation.
    ///
    /// This is the only hook permitted to block indefinitely; the controller
    /// invokes it on a dedicated worker thread so the caller of
    /// [`knit`](crate::lifecycle::PluginInstance::knit) is never blocked for
    /// the operation's duration. Closing the cycle afterwards — calling
    /// [`finish`](crate::lifecycle::PluginInstance::finish) or
    /// [`fail`](crate::lifecycle::PluginInstance::fail) — is the driver's or
    /// host's responsibility.
    ///
    /// # Errors
    ///
    /// Any error is logged by the worker and recorded as a `fail()`
    /// transition.
    fn on_knit(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError>;

    /// Restores internal state so a subsequent `configure` can safely
    /// re-initialise the driver, and signals completion externally (for
    /// example through the `progress` or `info` callback).
    ///
    /// # Errors
    ///
    /// Returns an error when completion cannot be signalled.
    fn on_finish(&self, callbacks: &InteractiveCallbacks) -> Result<(), PluginError>;

    /// Returns the set of configurable options and their valid domains.
    ///
    /// Pure; callable in any state.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotImplemented`] on discoverability stubs.
    fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError>;

    /// Checks a candidate configuration against driver-specific rules
    /// without mutating driver state.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Validation`] describing the first rejected
    /// option.
    fn validate_configuration(&self, conf: &KnittingOptions) -> Result<(), PluginError>;
}

/// Discoverability stub implementing no hooks.
///
/// Every hook fails with [`PluginError::NotImplemented`] identifying which
/// hook is missing and why it exists, so the contract can be explored even
/// without documentation.
///
/// # Example
///
/// ```
/// use knitlib_plugins::capability::{KnittingPlugin, UnimplementedPlugin};
///
/// let stub = UnimplementedPlugin;
/// let error = stub.publish_options().unwrap_err();
/// assert!(error.to_string().contains("publish_options"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedPlugin;

impl KnittingPlugin for UnimplementedPlugin {
    fn on_configure(
        &self,
        _options: &KnittingOptions,
        _callbacks: &InteractiveCallbacks,
    ) -> Result<(), PluginError> {
        Err(PluginError::NotImplemented {
            hook: Hook::OnConfigure,
        })
    }

    fn on_knit(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        Err(PluginError::NotImplemented { hook: Hook::OnKnit })
    }

    fn on_finish(&self, _callbacks: &InteractiveCallbacks) -> Result<(), PluginError> {
        Err(PluginError::NotImplemented {
            hook: Hook::OnFinish,
        })
    }

    fn publish_options(&self) -> Result<Vec<OptionDescriptor>, PluginError> {
        Err(PluginError::NotImplemented {
            hook: Hook::PublishOptions,
        })
    }

    fn validate_configuration(&self, _conf: &KnittingOptions) -> Result<(), PluginError> {
        Err(PluginError::NotImplemented {
            hook: Hook::ValidateConfiguration,
        })
    }
}

//! JSON-schema validation for knitting pattern documents.
//!
//! This crate is the validator collaborator consumed by driver `configure`
//! paths: given a parsed pattern or configuration document it answers a
//! plain yes/no. Schema construction errors propagate normally, but document
//! validation deliberately swallows the failure detail — it is logged at
//! error level and surfaced to the caller only as `false`. That
//! swallow-and-log behaviour belongs to this boundary alone; nothing else in
//! the framework downgrades errors.
//!
//! A [`PatternSchema`] is built explicitly — from a value, from text, or
//! from the bundled schema — and compiled once; hosts construct it up front
//! and pass it by reference to whatever needs it.
//!
//! # Example
//!
//! ```
//! use knitlib_knitpat::PatternSchema;
//! use serde_json::json;
//!
//! let schema = PatternSchema::bundled().unwrap();
//! let pattern = json!({
//!     "id": "garter-4",
//!     "name": "Garter stitch swatch",
//!     "rows": [["k", "k", "k", "k"], ["k", "k", "k", "k"]],
//! });
//! assert!(schema.validate_document(&pattern));
//! assert!(!schema.validate_document(&json!({"id": "garter-4"})));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;


/// Schema document shipped with the crate describing a knitting pattern.
const BUNDLED_SCHEMA: &str = include_str!("../schema/knitting_pattern_schema.json");

/// Errors raised while constructing a [`PatternSchema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema text was not valid JSON.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema document was valid JSON but not a valid schema.
    #[error("failed to compile schema: {message}")]
    Compile {
        /// Description of the offending schema construct.
        message: String,
    },
}

/// A compiled schema for validating knitting pattern documents.
pub struct PatternSchema {
    validator: jsonschema::Validator,
}

impl PatternSchema {
    /// Compiles a schema from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] when the document is not a valid
    /// JSON schema.
    pub fn from_value(schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|error| SchemaError::Compile {
                message: error.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Compiles the schema bundled with this crate.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the bundled document cannot be parsed
    /// or compiled; this indicates a packaging defect.
    pub fn bundled() -> Result<Self, SchemaError> {
        BUNDLED_SCHEMA.parse()
    }

    /// Checks `document` against the schema.
    ///
    /// Returns `true` when the document conforms. Any validation failure is
    /// caught and logged at error level rather than propagated; the caller
    /// sees only `false`.
    #[must_use]
    pub fn validate_document(&self, document: &serde_json::Value) -> bool {
        match self.validator.validate(document) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(%error, "pattern document failed schema validation");
                false
            }
        }
    }
}

impl FromStr for PatternSchema {
    type Err = SchemaError;

    fn from_str(schema: &str) -> Result<Self, Self::Err> {
        let parsed: serde_json::Value = serde_json::from_str(schema)?;
        Self::from_value(&parsed)
    }
}

impl fmt::Debug for PatternSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSchema").finish_non_exhaustive()
    }
}

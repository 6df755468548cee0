//! Error types for template import, resolution and compilation

use thiserror::Error;

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing, validating or compiling templates
///
/// Only fatal conditions live here. Recoverable conditions (an unresolved
/// binding, a mask that fell back to an ellipse) are reported as
/// [`crate::Diagnostic`] values next to a successful result.
#[derive(Error, Debug)]
pub enum Error {
    /// Two nodes in one schema share an id
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// A variant override or binding index entry names a node that does not exist
    #[error("Unknown node id '{node_id}' referenced by {referrer}")]
    DanglingReference { node_id: String, referrer: String },

    /// Canvas width/height must be positive
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: i64, height: i64 },

    /// Version/container rules or token declarations are violated
    #[error("Invalid schema structure: {0}")]
    StructureError(String),

    /// A style value references a token the schema does not declare
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// A token override targets a token that cannot be overridden
    #[error("Token '{0}' is not editable")]
    TokenNotEditable(String),

    /// A token has neither an override nor a stored default
    #[error("Token '{0}' has no value")]
    TokenWithoutValue(String),

    /// A color string could not be parsed
    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    /// The requested variant does not exist in the schema
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    /// No schema with this id has been imported
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// A binding field path is malformed
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),

    /// An adapter rejected its input
    #[error("Import failed: {0}")]
    ImportError(String),

    /// The markup document or a selector could not be parsed
    #[error("Markup parse failed: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// JSON (de)serialization failure
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error was raised by the import validation gate.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateNodeId(_)
                | Error::DanglingReference { .. }
                | Error::InvalidCanvas { .. }
                | Error::StructureError(_)
        )
    }
}

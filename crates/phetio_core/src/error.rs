//! Error types for phetio_core.
//!
//! Assertion failures only surface when assertions are enabled (see
//! [`crate::assertions::Assertions`]); validation failures on method calls
//! surface in every mode.

use thiserror::Error;

/// Main error type for IOType, emitter and action operations.
#[derive(Error, Debug)]
pub enum PhetioError {
    /// Debug-only invariant violations
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Parameter, argument or state validation failures
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed input strings
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown IOType: {0}")]
    UnknownType(String),

    #[error("{type_name} has no method {method}")]
    UnknownMethod { type_name: String, method: String },

    #[error("No instrumented instance with phetioID {0}")]
    UnknownInstance(String),

    #[error("IOType {0} is already registered")]
    DuplicateType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for phetio_core operations.
pub type Result<T> = std::result::Result<T, PhetioError>;

impl PhetioError {
    #[must_use]
    pub fn assertion<S: Into<String>>(msg: S) -> Self {
        Self::Assertion(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    #[must_use]
    pub fn unknown_method(type_name: &str, method: &str) -> Self {
        Self::UnknownMethod {
            type_name: type_name.to_string(),
            method: method.to_string(),
        }
    }

    /// Whether this error is a debug-only assertion.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}

impl From<phetio_data::ColorError> for PhetioError {
    fn from(err: phetio_data::ColorError) -> Self {
        match err {
            phetio_data::ColorError::Parse(_) => Self::Parse(err.to_string()),
            phetio_data::ColorError::InvalidDistance(_) => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhetioError::validation("bad argument");
        assert_eq!(err.to_string(), "Validation error: bad argument");
        let err = PhetioError::unknown_method("NodeIO", "explode");
        assert_eq!(err.to_string(), "NodeIO has no method explode");
    }

    #[test]
    fn test_color_errors_convert() {
        let err: PhetioError = phetio_data::Color::from_css("nope").unwrap_err().into();
        assert!(matches!(err, PhetioError::Parse(_)));
    }
}

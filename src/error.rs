//! Error types for delta operations
//!
//! The algebra itself is total over well-formed operands. Every variant here
//! reports a caller-side problem: a malformed operand, a changeset that could
//! not have been produced by a valid compose, or unreadable input.

use thiserror::Error;

/// Errors surfaced by the delta algebra, the descriptor loader and the wire codec
#[derive(Error, Debug)]
pub enum DeltaError {
    /// `diff` was called with an operand containing retains or deletes.
    /// The payload names the side: `"on"` (the receiver) or `"with"` (the argument).
    #[error("diff() called {0} non-document")]
    InvalidOperand(&'static str),

    /// A delta-valued retain met a run it cannot be applied to
    #[error("Illegal composition: {0}")]
    IllegalComposition(String),

    /// A serialized run could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// A run descriptor is structurally invalid
    #[error("Invalid run descriptor: {0}")]
    Descriptor(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DeltaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operand_message() {
        let err = DeltaError::InvalidOperand("on");
        assert_eq!(err.to_string(), "diff() called on non-document");

        let err = DeltaError::InvalidOperand("with");
        assert_eq!(err.to_string(), "diff() called with non-document");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DeltaError = json_err.into();
        assert!(matches!(err, DeltaError::Json(_)));
    }
}

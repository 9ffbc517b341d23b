//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// A single malformed row or record from an external source.
///
/// Parse errors are always recovered where they occur: the offending row is
/// skipped and the rest of the input is still used. They exist as values so
/// parsers can be tested and so skipped rows can be traced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Row did not have the expected number of fields
    #[error("expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// A field could not be interpreted
    #[error("Failed to parse {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A record was well-formed but carries no usable data
    #[error("empty record: {0}")]
    Empty(String),
}

impl ParseError {
    pub(crate) fn invalid(field: &str, reason: impl ToString) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

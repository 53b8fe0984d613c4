use std::fmt;

use thiserror::Error;

/// Errors surfaced synchronously by validation and by mutations of the class model.
///
/// Failing to resolve a class reference is never an error; it produces an unresolved
/// placeholder class instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid class name `{name}`: {reason}")]
    InvalidName {
        name: String,
        reason: InvalidNameReason,
    },
    #[error("unsupported mutation: {0}")]
    UnsupportedMutation(String),
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    #[error("cyclic supertype hierarchy through `{class}`")]
    CyclicHierarchy { class: String },
}

impl ModelError {
    pub(crate) fn invalid_name(name: &str, reason: InvalidNameReason) -> Self {
        ModelError::InvalidName {
            name: name.to_owned(),
            reason,
        }
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        ModelError::IllegalArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        ModelError::UnsupportedMutation(message.into())
    }
}

/// The specific syntax violation found in a class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidNameReason {
    Empty,
    InvalidStart(char),
    IllegalCharacter(char),
    ConsecutiveDots,
    TrailingDot,
}

impl fmt::Display for InvalidNameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidNameReason::Empty => f.write_str("name is empty"),
            InvalidNameReason::InvalidStart(ch) => write!(f, "invalid first character {ch:?}"),
            InvalidNameReason::IllegalCharacter(ch) => write!(f, "illegal character {ch:?}"),
            InvalidNameReason::ConsecutiveDots => f.write_str("`..` is not allowed"),
            InvalidNameReason::TrailingDot => f.write_str("`.` is not allowed at the end"),
        }
    }
}

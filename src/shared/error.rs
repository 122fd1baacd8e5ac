//! Shared Error Types
//!
//! Errors describing bad input data. They are raised before any storage or
//! token work happens and always surface to callers as client errors.
//!
//! # Usage
//!
//! ```rust
//! use rolegate::shared::error::SharedError;
//!
//! let error = SharedError::validation("roles", "role set cannot be empty");
//! ```
use thiserror::Error;

/// Input validation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A field holds a value that is not acceptable
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// A field's length is outside the accepted bounds
    #[error("Validation error in field '{field}': length must be between {min} and {max}")]
    LengthError {
        field: String,
        min: usize,
        max: usize,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new length error
    pub fn length(field: impl Into<String>, min: usize, max: usize) -> Self {
        Self::LengthError {
            field: field.into(),
            min,
            max,
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } | Self::LengthError { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Invalid email format");
        match error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_length_error_display() {
        let error = SharedError::length("password", 3, 20);
        let display = format!("{}", error);
        assert!(display.contains("password"));
        assert!(display.contains("between 3 and 20"));
        assert_eq!(error.field(), "password");
    }
}

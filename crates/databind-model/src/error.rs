//! Error types shared by every databind crate.

use thiserror::Error;

use crate::value::{Value, ValueType};

/// Errors raised while binding, joining or converting data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A row could not satisfy a binding.
    #[error("binding error: {message}")]
    Binding { message: String },

    /// An argument was rejected before any work was done.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The requested strategy has no implementation.
    #[error("the {name} strategy is not supported")]
    UnsupportedStrategy { name: &'static str },

    /// A value could not be converted to the requested type.
    #[error("cannot convert {value:?} to {target}")]
    Conversion { value: Value, target: ValueType },

    /// An XPath expression could not be parsed or evaluated.
    #[error("invalid XPath expression '{expression}': {message}")]
    XPath { expression: String, message: String },

    /// An XML document could not be parsed.
    #[error("xml error: {0}")]
    Xml(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for databind operations.
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    /// Create a Binding error.
    pub fn binding(message: impl Into<String>) -> Self {
        Self::Binding {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a Conversion error.
    pub fn conversion(value: Value, target: ValueType) -> Self {
        Self::Conversion { value, target }
    }

    /// Create an XPath error.
    pub fn xpath(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::XPath {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised by an unsatisfiable binding.
    pub fn is_binding_error(&self) -> bool {
        matches!(self, Self::Binding { .. })
    }
}

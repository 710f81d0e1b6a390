//! Evaluation errors.

use crate::CalcKind;
use thiserror::Error;

/// Result type for calculator evaluation.
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors raised while evaluating a calculator tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("Cannot convert value {value} to {target}")]
    UnsupportedConversion { value: String, target: CalcKind },

    #[error("Expected {expected} value, got {actual}")]
    UnexpectedValue {
        expected: &'static str,
        actual: String,
    },

    #[error("Dimension '{0}' has no default hierarchy")]
    NoDefaultHierarchy(String),

    #[error("Hierarchy '{0}' has no default member")]
    NoDefaultMember(String),

    #[error("Hierarchy '{0}' has no current member")]
    NoCurrentMember(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Default value of parameter '{0}' refers to itself")]
    CyclicParameter(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl CalcError {
    pub fn unsupported_conversion(value: impl ToString, target: CalcKind) -> Self {
        Self::UnsupportedConversion {
            value: value.to_string(),
            target,
        }
    }

    pub fn unexpected_value(expected: &'static str, actual: impl ToString) -> Self {
        Self::UnexpectedValue {
            expected,
            actual: actual.to_string(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation(message.into())
    }
}

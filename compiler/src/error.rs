//! Compiler error types.

use crate::Exp;
use mdx_calc::CalcError;
use mdx_core::Value;
use mdx_types::Type;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during compilation.
///
/// All of these are raised synchronously while the calculator tree is being
/// built; none is deferred to evaluation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The static type of an expression can never produce the requested shape.
    #[error("Expression {context} of type {actual} cannot be compiled as {expected}")]
    StaticTypeMismatch {
        expected: String,
        actual: String,
        context: String,
    },

    /// No conversion rule exists between two types.
    #[error("Cannot convert {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// A constant could not be folded to the requested type.
    #[error("Cannot fold constant {value} to {target}")]
    CompileTimeFoldFailure { value: String, target: String },

    /// The validator rejected an expression.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A calculator failed while being folded.
    #[error("Calc error: {0}")]
    Calc(#[from] CalcError),
}

impl CompileError {
    pub fn mismatch(expected: impl fmt::Display, actual: &Type, exp: &Exp) -> Self {
        Self::StaticTypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
            context: exp.to_string(),
        }
    }

    pub fn unsupported_conversion(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn fold_failure(value: &Value, target: impl fmt::Display) -> Self {
        Self::CompileTimeFoldFailure {
            value: format!("{} ({})", value, value.type_name()),
            target: target.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

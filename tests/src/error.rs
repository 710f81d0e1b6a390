//! Scenario errors.

use thiserror::Error;

/// Result type for scenario runs.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Assertion failed at step '{step}': {message}")]
    AssertionFailed { step: String, message: String },
}

impl ScenarioError {
    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}

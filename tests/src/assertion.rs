//! Assertion types and builders for verifying step results.

use mdx_calc::{CalcKind, CalcRef};
use mdx_core::Value;

use crate::error::{ScenarioError, ScenarioResult};

/// What running one step produced.
#[derive(Debug)]
pub struct StepOutcome {
    pub calc: CalcRef,
    pub value: Value,
    /// Cell reads made by the evaluation.
    pub reads: usize,
}

/// A complete assertion for a step result.
#[derive(Default)]
pub struct Assertion {
    // Evaluation assertions
    pub value: Option<Value>,
    pub reads: Option<usize>,

    // Calc tree assertions
    pub kind: Option<CalcKind>,
    pub calc_name: Option<String>,
    pub constant: Option<bool>,

    // Error assertions
    pub error: Option<String>,

    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&StepOutcome) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("value", &self.value)
            .field("reads", &self.reads)
            .field("kind", &self.kind)
            .field("calc_name", &self.calc_name)
            .field("constant", &self.constant)
            .field("error", &self.error)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a result.
    pub fn verify(&self, step: &str, result: &Result<StepOutcome, String>) -> ScenarioResult<()> {
        if let Some(ref expected_error) = self.error {
            return match result {
                Err(msg) if msg.contains(expected_error) => Ok(()),
                Err(msg) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected_error, msg),
                )),
                Ok(outcome) => Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', but step produced {}",
                        expected_error, outcome.value
                    ),
                )),
            };
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(msg) => {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("unexpected error: {}", msg),
                ))
            }
        };

        if let Some(ref expected) = self.value {
            if &outcome.value != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected value {}, got {}", expected, outcome.value),
                ));
            }
        }

        if let Some(expected) = self.reads {
            if outcome.reads != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} cell reads, got {}", expected, outcome.reads),
                ));
            }
        }

        if let Some(expected) = self.kind {
            if outcome.calc.kind() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} calc, got {}", expected, outcome.calc.kind()),
                ));
            }
        }

        if let Some(ref expected) = self.calc_name {
            if outcome.calc.name() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected calc '{}', got '{}'", expected, outcome.calc.name()),
                ));
            }
        }

        if let Some(expected) = self.constant {
            if outcome.calc.is_constant() != expected {
                let what = if expected { "constant" } else { "non-constant" };
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected a {} calc, got {}", what, outcome.calc.name()),
                ));
            }
        }

        if let Some(ref f) = self.custom {
            if !f(outcome) {
                return Err(ScenarioError::assertion_failed(step, "custom assertion failed"));
            }
        }

        Ok(())
    }
}

/// Builder for step assertions.
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    pub fn new() -> Self {
        Self {
            assertion: Assertion::new(),
        }
    }

    pub fn build(self) -> Assertion {
        self.assertion
    }

    // ========== Evaluation ==========

    pub fn value<V: IntoValue>(mut self, v: V) -> Self {
        self.assertion.value = Some(v.into_value());
        self
    }

    pub fn null(self) -> Self {
        self.value(Value::Null)
    }

    pub fn reads(mut self, n: usize) -> Self {
        self.assertion.reads = Some(n);
        self
    }

    // ========== Calc tree ==========

    pub fn kind(mut self, kind: CalcKind) -> Self {
        self.assertion.kind = Some(kind);
        self
    }

    /// The root calculator's display name.
    pub fn calc(mut self, name: impl Into<String>) -> Self {
        self.assertion.calc_name = Some(name.into());
        self
    }

    pub fn constant(mut self) -> Self {
        self.assertion.constant = Some(true);
        self
    }

    pub fn not_constant(mut self) -> Self {
        self.assertion.constant = Some(false);
        self
    }

    // ========== Errors ==========

    pub fn error(mut self, contains: impl Into<String>) -> Self {
        self.assertion.error = Some(contains.into());
        self
    }

    pub fn assert_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&StepOutcome) -> bool + Send + Sync + 'static,
    {
        self.assertion.custom = Some(Box::new(f));
        self
    }
}

impl Default for AssertionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversion into an expected value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdx_calc::ConstantCalc;
    use std::sync::Arc;

    fn outcome(value: Value) -> Result<StepOutcome, String> {
        Ok(StepOutcome {
            calc: Arc::new(ConstantCalc::new(mdx_types::Type::integer(), value.clone())),
            value,
            reads: 0,
        })
    }

    #[test]
    fn test_value_and_constant() {
        let assertion = AssertionBuilder::new().value(3i64).constant().reads(0).build();

        assert!(assertion.verify("s", &outcome(Value::Int(3))).is_ok());
        assert!(assertion.verify("s", &outcome(Value::Int(4))).is_err());
    }

    #[test]
    fn test_expected_error() {
        let assertion = AssertionBuilder::new().error("mismatch").build();

        assert!(assertion.verify("s", &Err("type mismatch".into())).is_ok());
        assert!(assertion.verify("s", &outcome(Value::Null)).is_err());
    }
}

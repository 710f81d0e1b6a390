//! Scalar conversion nodes.
//!
//! These adapt a calculator's runtime value to the interface a caller asked
//! for. `UnknownToCalc` is the generic runtime check; the others are the
//! specialized widening and narrowing adapters the compiler inserts when the
//! source kind is known.

use crate::calc::describe;
use crate::{Calc, CalcError, CalcKind, CalcRef, CalcResult, Evaluator};
use mdx_core::Value;
use mdx_types::Type;

/// Truncate a double toward zero, or `None` if it is not finite or falls
/// outside the `i64` range.
pub fn truncate_to_integer(d: f64) -> Option<i64> {
    let t = d.trunc();
    // i64::MIN as f64 is exact; i64::MAX as f64 rounds up to 2^63.
    if t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

fn narrow(d: f64) -> CalcResult<Value> {
    truncate_to_integer(d).map(Value::Int).ok_or_else(|| {
        CalcError::unsupported_conversion(describe(&Value::Double(d)), CalcKind::Integer)
    })
}

/// Checks and coerces a generic value to a requested kind at runtime.
///
/// Null passes through for scalar, member and tuple targets. A double
/// requested as an integer is truncated toward zero; an integer requested as
/// a double widens; a member requested as a tuple becomes a 1-tuple. Any other
/// mismatch is an `UnsupportedConversion` error naming the value.
#[derive(Debug)]
pub struct UnknownToCalc {
    ty: Type,
    target: CalcKind,
    child: CalcRef,
}

impl UnknownToCalc {
    pub fn new(ty: Type, target: CalcKind, child: CalcRef) -> Self {
        Self { ty, target, child }
    }

    pub fn target(&self) -> CalcKind {
        self.target
    }

    fn coerce(&self, value: Value) -> CalcResult<Value> {
        let coerced = match (self.target, value) {
            (CalcKind::Generic, v) => v,
            (_, Value::Null)
                if !matches!(
                    self.target,
                    CalcKind::Level | CalcKind::Hierarchy | CalcKind::Dimension | CalcKind::List
                ) =>
            {
                Value::Null
            }
            (CalcKind::Integer, Value::Int(i)) => Value::Int(i),
            (CalcKind::Integer, Value::Double(d)) => narrow(d)?,
            (CalcKind::Double, Value::Double(d)) => Value::Double(d),
            (CalcKind::Double, Value::Int(i)) => Value::Double(i as f64),
            (CalcKind::String, v @ Value::String(_)) => v,
            (CalcKind::Boolean, v @ Value::Bool(_)) => v,
            (CalcKind::DateTime, v @ Value::DateTime(_)) => v,
            (CalcKind::Member, v @ Value::Member(_)) => v,
            (CalcKind::Tuple, v @ Value::Tuple(_)) => v,
            (CalcKind::Tuple, Value::Member(m)) => Value::Tuple(vec![m]),
            (CalcKind::Level, v @ Value::Level(_)) => v,
            (CalcKind::Hierarchy, v @ Value::Hierarchy(_)) => v,
            (CalcKind::Dimension, v @ Value::Dimension(_)) => v,
            (CalcKind::List | CalcKind::Iter, v @ Value::List(_)) => v,
            (target, other) => {
                return Err(CalcError::unsupported_conversion(describe(&other), target))
            }
        };
        Ok(coerced)
    }
}

impl Calc for UnknownToCalc {
    fn name(&self) -> &str {
        match self.target {
            CalcKind::Generic => "UnknownToGeneric",
            CalcKind::Member => "UnknownToMember",
            CalcKind::Level => "UnknownToLevel",
            CalcKind::Hierarchy => "UnknownToHierarchy",
            CalcKind::Dimension => "UnknownToDimension",
            CalcKind::Tuple => "UnknownToTuple",
            CalcKind::Integer => "UnknownToInteger",
            CalcKind::Double => "UnknownToDouble",
            CalcKind::String => "UnknownToString",
            CalcKind::Boolean => "UnknownToBoolean",
            CalcKind::DateTime => "UnknownToDateTime",
            CalcKind::List => "UnknownToList",
            CalcKind::Iter => "UnknownToIter",
        }
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        self.target
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let value = self.child.evaluate(evaluator)?;
        self.coerce(value)
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

/// Narrows a double to an integer, truncating toward zero. Doubles that are
/// not finite or do not fit an `i64` are an error.
#[derive(Debug)]
pub struct DoubleToIntegerCalc {
    ty: Type,
    child: CalcRef,
}

impl DoubleToIntegerCalc {
    pub fn new(child: CalcRef) -> Self {
        Self {
            ty: Type::integer(),
            child,
        }
    }
}

impl Calc for DoubleToIntegerCalc {
    fn name(&self) -> &str {
        "DoubleToInteger"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Integer
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(match self.child.evaluate_double(evaluator)? {
            Some(d) => narrow(d)?,
            None => Value::Null,
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

/// Widens an integer to a double.
#[derive(Debug)]
pub struct IntegerToDoubleCalc {
    ty: Type,
    child: CalcRef,
}

impl IntegerToDoubleCalc {
    pub fn new(child: CalcRef) -> Self {
        Self {
            ty: Type::numeric(),
            child,
        }
    }
}

impl Calc for IntegerToDoubleCalc {
    fn name(&self) -> &str {
        "IntegerToDouble"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Double
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(match self.child.evaluate_integer(evaluator)? {
            Some(i) => Value::Double(i as f64),
            None => Value::Null,
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

/// Converts a number to a boolean: non-zero is true, null stays null.
#[derive(Debug)]
pub struct NumericToBooleanCalc {
    ty: Type,
    child: CalcRef,
}

impl NumericToBooleanCalc {
    pub fn new(child: CalcRef) -> Self {
        Self {
            ty: Type::boolean(),
            child,
        }
    }
}

impl Calc for NumericToBooleanCalc {
    fn name(&self) -> &str {
        "NumericToBoolean"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Boolean
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(match self.child.evaluate_double(evaluator)? {
            Some(n) => Value::Bool(n != 0.0),
            None => Value::Null,
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

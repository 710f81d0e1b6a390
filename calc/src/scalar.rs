//! Scalar operators: cast, arithmetic, concatenation and logic.

use crate::calc::describe;
use crate::convert::truncate_to_integer;
use crate::{Calc, CalcError, CalcKind, CalcRef, CalcResult, Evaluator};
use mdx_core::Value;
use mdx_types::{ScalarType, Type};
use std::fmt;

/// Explicit conversion between scalar types.
///
/// Unlike the runtime check nodes, a cast parses strings and converts
/// booleans and numbers into each other.
#[derive(Debug)]
pub struct CastCalc {
    ty: Type,
    target: ScalarType,
    child: CalcRef,
}

impl CastCalc {
    pub fn new(target: ScalarType, child: CalcRef) -> Self {
        Self {
            ty: Type::Scalar(target),
            target,
            child,
        }
    }

    /// Apply the cast to a value.
    pub fn cast(target: ScalarType, value: Value) -> CalcResult<Value> {
        let kind = CalcKind::for_type(&Type::Scalar(target));
        let fail = |v: &Value| CalcError::unsupported_conversion(describe(v), kind);
        if value.is_null() {
            return Ok(Value::Null);
        }
        let cast = match target {
            ScalarType::Any => value,
            ScalarType::Null => Value::Null,
            ScalarType::Numeric(n) if n.is_integer() => match &value {
                Value::Int(i) => Value::Int(*i),
                Value::Double(d) => match truncate_to_integer(*d) {
                    Some(i) => Value::Int(i),
                    None => return Err(fail(&value)),
                },
                Value::Bool(b) => Value::Int(i64::from(*b)),
                Value::String(s) => match parse_number(s).and_then(truncate_to_integer) {
                    Some(i) => Value::Int(i),
                    None => return Err(fail(&value)),
                },
                _ => return Err(fail(&value)),
            },
            ScalarType::Numeric(_) => match &value {
                Value::Int(i) => Value::Double(*i as f64),
                Value::Double(d) => Value::Double(*d),
                Value::Bool(b) => Value::Double(if *b { 1.0 } else { 0.0 }),
                Value::String(s) => match parse_number(s) {
                    Some(d) => Value::Double(d),
                    None => return Err(fail(&value)),
                },
                _ => return Err(fail(&value)),
            },
            ScalarType::String if value.is_scalar() => Value::String(scalar_text(&value)),
            ScalarType::String => return Err(fail(&value)),
            ScalarType::Boolean => match &value {
                Value::Bool(b) => Value::Bool(*b),
                Value::Int(i) => Value::Bool(*i != 0),
                Value::Double(d) => Value::Bool(*d != 0.0),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
                _ => return Err(fail(&value)),
            },
            ScalarType::DateTime => match &value {
                Value::DateTime(t) => Value::DateTime(*t),
                Value::Int(i) => Value::DateTime(*i),
                _ => return Err(fail(&value)),
            },
        };
        Ok(cast)
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Text of a scalar value without the quoting of `Display`.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Calc for CastCalc {
    fn name(&self) -> &str {
        "Cast"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::for_type(&self.ty)
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let value = self.child.evaluate(evaluator)?;
        Self::cast(self.target, value)
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

/// An arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}

/// Binary arithmetic over numbers.
///
/// Integer operands stay integers except under division. A null operand
/// makes the result null. Dividing by zero is an evaluation error.
#[derive(Debug)]
pub struct ArithmeticCalc {
    ty: Type,
    op: ArithmeticOp,
    left: CalcRef,
    right: CalcRef,
}

impl ArithmeticCalc {
    pub fn new(op: ArithmeticOp, left: CalcRef, right: CalcRef) -> Self {
        let ty = Self::result_type(op, left.ty(), right.ty());
        Self {
            ty,
            op,
            left,
            right,
        }
    }

    /// Static result type of `left op right`.
    pub fn result_type(op: ArithmeticOp, left: &Type, right: &Type) -> Type {
        if op != ArithmeticOp::Div && left.is_integer() && right.is_integer() {
            Type::integer()
        } else {
            Type::numeric()
        }
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }
}

impl Calc for ArithmeticCalc {
    fn name(&self) -> &str {
        match self.op {
            ArithmeticOp::Add => "Plus",
            ArithmeticOp::Sub => "Minus",
            ArithmeticOp::Mul => "Multiply",
            ArithmeticOp::Div => "Divide",
        }
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::for_type(&self.ty)
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let left = self.left.evaluate(evaluator)?;
        let right = self.right.evaluate(evaluator)?;
        match (&left, &right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Int(a), Value::Int(b)) if self.op != ArithmeticOp::Div => {
                let result = match self.op {
                    ArithmeticOp::Add => a.checked_add(*b),
                    ArithmeticOp::Sub => a.checked_sub(*b),
                    _ => a.checked_mul(*b),
                };
                result.map(Value::Int).ok_or_else(|| {
                    CalcError::evaluation(format!("integer overflow in {} {} {}", a, self.op, b))
                })
            }
            _ => {
                let a = left
                    .as_number()
                    .ok_or_else(|| CalcError::unexpected_value("number", describe(&left)))?;
                let b = right
                    .as_number()
                    .ok_or_else(|| CalcError::unexpected_value("number", describe(&right)))?;
                let result = match self.op {
                    ArithmeticOp::Add => a + b,
                    ArithmeticOp::Sub => a - b,
                    ArithmeticOp::Mul => a * b,
                    ArithmeticOp::Div if b == 0.0 => return Err(CalcError::DivisionByZero),
                    ArithmeticOp::Div => a / b,
                };
                Ok(Value::Double(result))
            }
        }
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.left, &self.right]
    }
}

/// String concatenation. Null parts contribute nothing.
#[derive(Debug)]
pub struct ConcatCalc {
    ty: Type,
    parts: Vec<CalcRef>,
}

impl ConcatCalc {
    pub fn new(parts: Vec<CalcRef>) -> Self {
        Self {
            ty: Type::string(),
            parts,
        }
    }
}

impl Calc for ConcatCalc {
    fn name(&self) -> &str {
        "Concat"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::String
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let mut out = String::new();
        for part in &self.parts {
            if let Some(s) = part.evaluate_string(evaluator)? {
                out.push_str(&s);
            }
        }
        Ok(Value::String(out))
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        self.parts.iter().collect()
    }
}

/// A logical operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// Three-valued logic: null is unknown.
///
/// `And` is false as soon as one operand is false and `Or` is true as soon
/// as one operand is true; later operands are not evaluated.
#[derive(Debug)]
pub struct LogicalCalc {
    ty: Type,
    op: LogicalOp,
    operands: Vec<CalcRef>,
}

impl LogicalCalc {
    pub fn new(op: LogicalOp, operands: Vec<CalcRef>) -> Self {
        Self {
            ty: Type::boolean(),
            op,
            operands,
        }
    }

    pub fn op(&self) -> LogicalOp {
        self.op
    }
}

impl Calc for LogicalCalc {
    fn name(&self) -> &str {
        match self.op {
            LogicalOp::And => "And",
            LogicalOp::Or => "Or",
            LogicalOp::Not => "Not",
        }
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Boolean
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let (short_circuit, identity) = match self.op {
            LogicalOp::Not => {
                let operand = match self.operands.first() {
                    Some(operand) => operand,
                    None => return Err(CalcError::evaluation("Not requires an operand")),
                };
                return Ok(match operand.evaluate_boolean(evaluator)? {
                    Some(b) => Value::Bool(!b),
                    None => Value::Null,
                });
            }
            LogicalOp::And => (false, true),
            LogicalOp::Or => (true, false),
        };

        let mut unknown = false;
        for operand in &self.operands {
            match operand.evaluate_boolean(evaluator)? {
                Some(b) if b == short_circuit => return Ok(Value::Bool(short_circuit)),
                Some(_) => {}
                None => unknown = true,
            }
        }
        Ok(if unknown {
            Value::Null
        } else {
            Value::Bool(identity)
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        self.operands.iter().collect()
    }
}

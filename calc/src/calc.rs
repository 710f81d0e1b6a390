//! The calculator contract.

use crate::{CalcError, CalcResult, Evaluator};
use mdx_core::{Dimension, Hierarchy, Level, Member, Tuple, TupleIter, TupleList, Value};
use mdx_types::{ScalarType, Type};
use std::fmt;
use std::sync::Arc;

/// A shared calculator node.
pub type CalcRef = Arc<dyn Calc>;

/// The interface a calculator literally satisfies.
///
/// The compiler compares the kind of a compiled node with the kind an entry
/// point promises, and wraps the node in a conversion when they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalcKind {
    /// Any value; callers must check it at runtime.
    Generic,
    Member,
    Level,
    Hierarchy,
    Dimension,
    Tuple,
    Integer,
    Double,
    String,
    Boolean,
    DateTime,
    /// A materialized set.
    List,
    /// A lazily produced set.
    Iter,
}

impl CalcKind {
    /// The kind a calculator of this static type naturally has.
    pub fn for_type(ty: &Type) -> CalcKind {
        match ty {
            Type::Scalar(ScalarType::Numeric(n)) if n.is_integer() => CalcKind::Integer,
            Type::Scalar(ScalarType::Numeric(_)) => CalcKind::Double,
            Type::Scalar(ScalarType::String) => CalcKind::String,
            Type::Scalar(ScalarType::Boolean) => CalcKind::Boolean,
            Type::Scalar(ScalarType::DateTime) => CalcKind::DateTime,
            Type::Scalar(_) | Type::Cube => CalcKind::Generic,
            Type::Member(_) => CalcKind::Member,
            Type::Level(_) => CalcKind::Level,
            Type::Hierarchy(_) => CalcKind::Hierarchy,
            Type::Dimension(_) => CalcKind::Dimension,
            Type::Tuple(_) => CalcKind::Tuple,
            Type::Set(_) => CalcKind::List,
        }
    }

    /// Check if a calculator of this kind can be used where `requested` is
    /// expected without conversion. A list can always be iterated.
    pub fn satisfies(self, requested: CalcKind) -> bool {
        self == requested
            || requested == CalcKind::Generic
            || (self == CalcKind::List && requested == CalcKind::Iter)
    }
}

impl fmt::Display for CalcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The shape a set-valued result is delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStyle {
    /// A materialized list that may share storage and must not be mutated.
    List,
    /// A materialized list the caller owns and may mutate.
    MutableList,
    /// A lazy iterator.
    Iterable,
    /// A single value.
    Value,
    /// Whatever is cheapest.
    Any,
}

impl ResultStyle {
    pub const ANY_ONLY: &'static [ResultStyle] = &[ResultStyle::Any];
    pub const ITERABLE_ONLY: &'static [ResultStyle] = &[ResultStyle::Iterable];
    pub const LIST_ONLY: &'static [ResultStyle] = &[ResultStyle::List];
    pub const MUTABLE_LIST_ONLY: &'static [ResultStyle] = &[ResultStyle::MutableList];
    pub const ITERABLE_ANY: &'static [ResultStyle] = &[ResultStyle::Iterable, ResultStyle::Any];
    pub const ITERABLE_LIST_MUTABLE_LIST: &'static [ResultStyle] = &[
        ResultStyle::Iterable,
        ResultStyle::List,
        ResultStyle::MutableList,
    ];
}

impl fmt::Display for ResultStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultStyle::List => "LIST",
            ResultStyle::MutableList => "MUTABLE_LIST",
            ResultStyle::Iterable => "ITERABLE",
            ResultStyle::Value => "VALUE",
            ResultStyle::Any => "ANY",
        };
        write!(f, "{}", s)
    }
}

/// A compiled, executable expression.
///
/// Calculator trees are built once by the compiler and never mutated. They
/// are shared as [`CalcRef`] and may be evaluated concurrently by independent
/// evaluators.
pub trait Calc: fmt::Debug + Send + Sync {
    /// Display name, used by the calc tree writer.
    fn name(&self) -> &str;

    /// Static type of the values this calculator produces.
    fn ty(&self) -> &Type;

    /// The interface this calculator satisfies.
    fn kind(&self) -> CalcKind;

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value>;

    fn child_calcs(&self) -> Vec<&CalcRef> {
        Vec::new()
    }

    /// Whether the result may change when the current member of `hierarchy`
    /// changes.
    fn depends_on(&self, hierarchy: &Hierarchy) -> bool {
        self.child_calcs().iter().any(|c| c.depends_on(hierarchy))
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::Value
    }

    /// The value of a calculator known at compile time.
    fn constant_value(&self) -> Option<&Value> {
        None
    }

    fn is_constant(&self) -> bool {
        self.constant_value().is_some()
    }

    /// Evaluate a set lazily. Lists hand out an iterator over their tuples.
    fn evaluate_iterable(&self, evaluator: &mut dyn Evaluator) -> CalcResult<TupleIter> {
        match self.evaluate(evaluator)? {
            Value::List(list) => Ok(list.into_tuple_iter()),
            Value::Null => Ok(Box::new(std::iter::empty())),
            other => Err(CalcError::unexpected_value("list", describe(&other))),
        }
    }

    // ========== Typed evaluation ==========

    /// Evaluate to a member; `None` for null.
    fn evaluate_member(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<Arc<Member>>> {
        match self.evaluate(evaluator)? {
            Value::Member(m) => Ok(Some(m)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("member", describe(&other))),
        }
    }

    fn evaluate_level(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<Arc<Level>>> {
        match self.evaluate(evaluator)? {
            Value::Level(l) => Ok(Some(l)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("level", describe(&other))),
        }
    }

    fn evaluate_hierarchy(
        &self,
        evaluator: &mut dyn Evaluator,
    ) -> CalcResult<Option<Arc<Hierarchy>>> {
        match self.evaluate(evaluator)? {
            Value::Hierarchy(h) => Ok(Some(h)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("hierarchy", describe(&other))),
        }
    }

    fn evaluate_dimension(
        &self,
        evaluator: &mut dyn Evaluator,
    ) -> CalcResult<Option<Arc<Dimension>>> {
        match self.evaluate(evaluator)? {
            Value::Dimension(d) => Ok(Some(d)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("dimension", describe(&other))),
        }
    }

    fn evaluate_tuple(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<Tuple>> {
        match self.evaluate(evaluator)? {
            Value::Tuple(t) => Ok(Some(t)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("tuple", describe(&other))),
        }
    }

    fn evaluate_integer(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<i64>> {
        match self.evaluate(evaluator)? {
            Value::Int(i) => Ok(Some(i)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("integer", describe(&other))),
        }
    }

    /// Evaluate to a double. Integers widen losslessly.
    fn evaluate_double(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<f64>> {
        match self.evaluate(evaluator)? {
            Value::Double(d) => Ok(Some(d)),
            Value::Int(i) => Ok(Some(i as f64)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("double", describe(&other))),
        }
    }

    fn evaluate_string(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<String>> {
        match self.evaluate(evaluator)? {
            Value::String(s) => Ok(Some(s)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("string", describe(&other))),
        }
    }

    fn evaluate_boolean(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<bool>> {
        match self.evaluate(evaluator)? {
            Value::Bool(b) => Ok(Some(b)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("boolean", describe(&other))),
        }
    }

    fn evaluate_datetime(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Option<i64>> {
        match self.evaluate(evaluator)? {
            Value::DateTime(t) => Ok(Some(t)),
            Value::Null => Ok(None),
            other => Err(CalcError::unexpected_value("datetime", describe(&other))),
        }
    }

    fn evaluate_list(&self, evaluator: &mut dyn Evaluator) -> CalcResult<TupleList> {
        match self.evaluate(evaluator)? {
            Value::List(list) => Ok(list),
            Value::Null => Ok(TupleList::empty(self.ty().arity())),
            other => Err(CalcError::unexpected_value("list", describe(&other))),
        }
    }
}

/// Render a value with its type name for error messages.
pub(crate) fn describe(value: &Value) -> String {
    format!("{} ({})", value, value.type_name())
}

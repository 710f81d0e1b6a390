//! Compile-time constant calculator.

use crate::{Calc, CalcKind, CalcResult, Evaluator};
use mdx_core::{Dimension, Hierarchy, Level, Member, Value};
use mdx_types::{DimensionType, HierarchyType, LevelType, MemberType, Type};
use std::sync::Arc;

/// A calculator whose value is fixed at compile time.
///
/// Evaluation never touches the evaluator.
#[derive(Debug, Clone)]
pub struct ConstantCalc {
    ty: Type,
    kind: CalcKind,
    value: Value,
}

impl ConstantCalc {
    /// A constant whose kind follows from its type.
    pub fn new(ty: Type, value: Value) -> Self {
        let kind = CalcKind::for_type(&ty);
        Self { ty, kind, value }
    }

    /// A null constant satisfying a given kind.
    pub fn null(kind: CalcKind, ty: Type) -> Self {
        Self {
            ty,
            kind,
            value: Value::Null,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::new(Type::integer(), Value::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(Type::numeric(), Value::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Type::string(), Value::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Type::boolean(), Value::Bool(value))
    }

    pub fn member(member: Arc<Member>) -> Self {
        Self::new(
            Type::Member(MemberType::for_member(&member)),
            Value::Member(member),
        )
    }

    pub fn level(level: Arc<Level>) -> Self {
        Self::new(Type::Level(LevelType::for_level(&level)), Value::Level(level))
    }

    pub fn hierarchy(hierarchy: Arc<Hierarchy>) -> Self {
        Self::new(
            Type::Hierarchy(HierarchyType::for_hierarchy(&hierarchy)),
            Value::Hierarchy(hierarchy),
        )
    }

    pub fn dimension(dimension: Arc<Dimension>) -> Self {
        Self::new(
            Type::Dimension(DimensionType::for_dimension(&dimension)),
            Value::Dimension(dimension),
        )
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Calc for ConstantCalc {
    fn name(&self) -> &str {
        "Constant"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        self.kind
    }

    fn evaluate(&self, _evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(self.value.clone())
    }

    fn depends_on(&self, _hierarchy: &Hierarchy) -> bool {
        false
    }

    fn constant_value(&self) -> Option<&Value> {
        Some(&self.value)
    }
}

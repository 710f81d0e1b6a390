//! The Type enum.

use crate::{DimensionType, HierarchyType, LevelType, MemberType, NumericType, ScalarType};
use mdx_core::{DimensionId, HierarchyId, LevelId, MemberId, TupleList, Value};
use std::fmt;

/// The static type of an expression or calculator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(ScalarType),
    Member(MemberType),
    Level(LevelType),
    Hierarchy(HierarchyType),
    Dimension(DimensionType),
    /// A tuple of members; element types are usually member types.
    Tuple(Vec<Type>),
    /// A set of members or tuples.
    Set(Box<Type>),
    Cube,
}

impl Type {
    // ========== Constructors ==========

    pub fn scalar() -> Self {
        Type::Scalar(ScalarType::Any)
    }

    pub fn numeric() -> Self {
        Type::Scalar(ScalarType::Numeric(NumericType::Any))
    }

    pub fn integer() -> Self {
        Type::Scalar(ScalarType::Numeric(NumericType::integer()))
    }

    pub fn decimal(precision: u32, scale: i32) -> Self {
        Type::Scalar(ScalarType::Numeric(NumericType::decimal(precision, scale)))
    }

    pub fn string() -> Self {
        Type::Scalar(ScalarType::String)
    }

    pub fn boolean() -> Self {
        Type::Scalar(ScalarType::Boolean)
    }

    pub fn datetime() -> Self {
        Type::Scalar(ScalarType::DateTime)
    }

    pub fn null() -> Self {
        Type::Scalar(ScalarType::Null)
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    // ========== Classification ==========

    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Scalar(s) if s.is_numeric())
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Scalar(s) if s.is_integer())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Scalar(ScalarType::Null))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Type::Set(_))
    }

    /// Check if this is one of the dimensional kinds.
    pub fn is_dimensional(&self) -> bool {
        matches!(
            self,
            Type::Member(_) | Type::Level(_) | Type::Hierarchy(_) | Type::Dimension(_)
        )
    }

    /// Check if an expression of this type can be used where a member is
    /// expected, possibly through `.CurrentMember`.
    pub fn could_be_member(&self) -> bool {
        matches!(
            self,
            Type::Member(_) | Type::Hierarchy(_) | Type::Dimension(_)
        )
    }

    /// Number of members in a value of this type: the element count of a
    /// tuple (or of a set's tuples), else 1.
    pub fn arity(&self) -> usize {
        match self {
            Type::Tuple(elements) => elements.len(),
            Type::Set(element) => element.arity(),
            _ => 1,
        }
    }

    // ========== Derived types ==========

    /// The type of the cell value read through a member or tuple.
    pub fn value_type(&self) -> Type {
        match self {
            Type::Scalar(_) => self.clone(),
            _ => Type::scalar(),
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Set(element) => Some(element),
            _ => None,
        }
    }

    /// Member type of a member, hierarchy or dimension expression.
    pub fn to_member_type(&self) -> Option<MemberType> {
        match self {
            Type::Member(m) => Some(*m),
            Type::Hierarchy(_) | Type::Dimension(_) => Some(MemberType::for_type(self)),
            _ => None,
        }
    }

    /// Like `to_member_type`, but tuples are passed through.
    pub fn to_member_or_tuple_type(&self) -> Option<Type> {
        match self {
            Type::Tuple(_) => Some(self.clone()),
            _ => self.to_member_type().map(Type::Member),
        }
    }

    // ========== Known schema objects ==========

    /// The dimension statically known for this type.
    pub fn dimension_id(&self) -> Option<DimensionId> {
        match self {
            Type::Member(t) => t.dimension(),
            Type::Level(t) => t.dimension(),
            Type::Hierarchy(t) => t.dimension(),
            Type::Dimension(t) => t.dimension(),
            Type::Set(e) => e.dimension_id(),
            _ => None,
        }
    }

    pub fn hierarchy_id(&self) -> Option<HierarchyId> {
        match self {
            Type::Member(t) => t.hierarchy(),
            Type::Level(t) => t.hierarchy(),
            Type::Hierarchy(t) => t.hierarchy(),
            Type::Set(e) => e.hierarchy_id(),
            _ => None,
        }
    }

    pub fn level_id(&self) -> Option<LevelId> {
        match self {
            Type::Member(t) => t.level(),
            Type::Level(t) => t.level(),
            Type::Set(e) => e.level_id(),
            _ => None,
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        match self {
            Type::Member(t) => t.member(),
            _ => None,
        }
    }

    // ========== Runtime check ==========

    /// Check if a runtime value is an instance of this type.
    ///
    /// Meant for assertions and tests; evaluation never calls it.
    pub fn is_instance(&self, value: &Value) -> bool {
        match (self, value) {
            (Type::Scalar(s), v) => scalar_instance(s, v),
            (Type::Member(t), Value::Member(m)) => t.matches(m),
            (Type::Level(t), Value::Level(l)) => t.matches(l),
            (Type::Hierarchy(t), Value::Hierarchy(h)) => t.matches(h),
            (Type::Dimension(t), Value::Dimension(d)) => t.matches(d),
            (Type::Tuple(elements), Value::Tuple(members)) => {
                elements.len() == members.len()
                    && elements
                        .iter()
                        .zip(members.iter())
                        .all(|(t, m)| t.is_instance(&Value::Member(m.clone())))
            }
            (Type::Tuple(elements), Value::Member(_)) => {
                elements.len() == 1 && elements[0].is_instance(value)
            }
            (Type::Set(element), Value::List(list)) => list_instance(element, list),
            _ => false,
        }
    }
}

fn scalar_instance(ty: &ScalarType, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match ty {
        ScalarType::Any => value.is_scalar(),
        ScalarType::Numeric(n) if n.is_integer() => matches!(value, Value::Int(_)),
        ScalarType::Numeric(_) => value.is_numeric(),
        ScalarType::String => matches!(value, Value::String(_)),
        ScalarType::Boolean => matches!(value, Value::Bool(_)),
        ScalarType::DateTime => matches!(value, Value::DateTime(_)),
        ScalarType::Null => false,
    }
}

fn list_instance(element: &Type, list: &TupleList) -> bool {
    if list.arity() != element.arity() {
        return false;
    }
    list.iter().all(|tuple| {
        if tuple.len() == 1 {
            element.is_instance(&Value::Member(tuple[0].clone()))
        } else {
            element.is_instance(&Value::Tuple(tuple))
        }
    })
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(s) => write!(f, "{}", s),
            Type::Member(t) => write!(f, "{}", t),
            Type::Level(t) => write!(f, "{}", t),
            Type::Hierarchy(t) => write!(f, "{}", t),
            Type::Dimension(t) => write!(f, "{}", t),
            Type::Tuple(elements) => {
                write!(f, "TupleType<")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ">")
            }
            Type::Set(element) => write!(f, "SetType<{}>", element),
            Type::Cube => write!(f, "CubeType"),
        }
    }
}

impl From<ScalarType> for Type {
    fn from(s: ScalarType) -> Self {
        Type::Scalar(s)
    }
}

impl From<MemberType> for Type {
    fn from(m: MemberType) -> Self {
        Type::Member(m)
    }
}

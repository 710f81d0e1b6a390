//! Unification and dependency analysis over the type lattice.

use crate::{HierarchyType, MemberType, Type};
use mdx_core::{DimensionId, Hierarchy};

impl Type {
    /// Whether a value of this type may (`definitely = false`) or must
    /// (`definitely = true`) be a member of the given dimension.
    pub fn uses_dimension(&self, dimension: DimensionId, definitely: bool) -> bool {
        match self {
            Type::Member(t) => t.uses_dimension(dimension, definitely),
            Type::Level(t) => t.uses_dimension(dimension, definitely),
            Type::Hierarchy(t) => t.uses_dimension(dimension, definitely),
            Type::Dimension(t) => t.uses_dimension(dimension, definitely),
            Type::Tuple(elements) => elements
                .iter()
                .any(|e| e.uses_dimension(dimension, definitely)),
            Type::Set(element) => element.uses_dimension(dimension, definitely),
            Type::Scalar(_) | Type::Cube => false,
        }
    }

    /// Whether a value of this type may (`definitely = false`) or must
    /// (`definitely = true`) be a member of the given hierarchy.
    pub fn uses_hierarchy(&self, hierarchy: &Hierarchy, definitely: bool) -> bool {
        match self {
            Type::Member(t) => t.uses_hierarchy(hierarchy, definitely),
            Type::Level(t) => t.uses_hierarchy(hierarchy, definitely),
            Type::Hierarchy(t) => t.uses_hierarchy(hierarchy, definitely),
            Type::Dimension(t) => t.uses_hierarchy(hierarchy, definitely),
            Type::Tuple(elements) => elements
                .iter()
                .any(|e| e.uses_hierarchy(hierarchy, definitely)),
            Type::Set(element) => element.uses_hierarchy(hierarchy, definitely),
            Type::Scalar(_) | Type::Cube => false,
        }
    }

    /// Most specific common supertype of two types, or `None`.
    ///
    /// When `conversions` is given, dimensional types of different kinds
    /// unify by implicit conversion and the counter is incremented once per
    /// converted operand. Without it such pairs have no common type.
    pub fn compute_common_type(
        &self,
        other: &Type,
        conversions: Option<&mut usize>,
    ) -> Option<Type> {
        if self == other {
            return Some(self.clone());
        }
        match (self, other) {
            (Type::Scalar(a), Type::Scalar(b)) => Some(Type::Scalar(a.common(b))),
            (Type::Member(a), Type::Member(b)) => Some(Type::Member(a.common(b))),
            (Type::Level(a), Type::Level(b)) => Some(Type::Level(a.common(b))),
            (Type::Hierarchy(a), Type::Hierarchy(b)) => Some(Type::Hierarchy(a.common(b))),
            (Type::Dimension(a), Type::Dimension(b)) => Some(Type::Dimension(a.common(b))),

            (Type::Tuple(a), Type::Tuple(b)) => common_tuple(a, b, conversions),
            (Type::Member(_), Type::Tuple(b)) => {
                common_tuple(std::slice::from_ref(self), b, conversions)
            }
            (Type::Tuple(a), Type::Member(_)) => {
                common_tuple(a, std::slice::from_ref(other), conversions)
            }

            // A member or tuple against a scalar is read for its cell value.
            (Type::Member(_) | Type::Tuple(_), Type::Scalar(_)) => {
                self.value_type().compute_common_type(other, conversions)
            }
            (Type::Scalar(_), Type::Member(_) | Type::Tuple(_)) => {
                self.compute_common_type(&other.value_type(), conversions)
            }

            (Type::Set(a), Type::Set(b)) => a.compute_common_type(b, conversions).map(Type::set),

            (a, b) if a.is_dimensional() && b.is_dimensional() => {
                let counter = conversions?;
                common_by_conversion(a, b, counter)
            }

            _ => None,
        }
    }
}

/// Slot-wise common type of two tuples. The result has the longer arity;
/// missing slots of the shorter tuple are padded with plain scalar.
fn common_tuple(a: &[Type], b: &[Type], mut conversions: Option<&mut usize>) -> Option<Type> {
    let pad = Type::scalar();
    let arity = a.len().max(b.len());
    let mut elements = Vec::with_capacity(arity);
    for i in 0..arity {
        let left = a.get(i).unwrap_or(&pad);
        let right = b.get(i).unwrap_or(&pad);
        elements.push(left.compute_common_type(right, conversions.as_deref_mut())?);
    }
    Some(Type::Tuple(elements))
}

/// Unify two dimensional types of different kinds.
///
/// Dimension and hierarchy meet at hierarchy; any pair involving a level or
/// a member meets at member.
fn common_by_conversion(a: &Type, b: &Type, counter: &mut usize) -> Option<Type> {
    match (a, b) {
        (Type::Dimension(d), Type::Hierarchy(h)) | (Type::Hierarchy(h), Type::Dimension(d)) => {
            *counter += 1;
            let converted = HierarchyType::for_type(&Type::Dimension(*d));
            Some(Type::Hierarchy(converted.common(h)))
        }
        _ => {
            let mut to_member = |t: &Type| match t {
                Type::Member(m) => *m,
                _ => {
                    *counter += 1;
                    MemberType::for_type(t)
                }
            };
            let left = to_member(a);
            let right = to_member(b);
            Some(Type::Member(left.common(&right)))
        }
    }
}

/// Common type of a list of types, folding left to right.
pub fn common_type(allow_conversions: bool, types: &[Type]) -> Option<Type> {
    let mut conversions = 0usize;
    let (first, rest) = types.split_first()?;
    rest.iter().try_fold(first.clone(), |acc, t| {
        let counter = if allow_conversions {
            Some(&mut conversions)
        } else {
            None
        };
        acc.compute_common_type(t, counter)
    })
}

/// Check if two set types can be combined by a set union.
pub fn is_union_compatible(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Set(x), Type::Set(y)) => {
            x.arity() == y.arity() && x.compute_common_type(y, None).is_some()
        }
        _ => false,
    }
}

//! MDX Type Lattice
//!
//! Static types of expressions and calculators.
//!
//! Responsibilities:
//! - Model scalar types and the dimensional types (dimension, hierarchy,
//!   level, member) with their optional specialization chain
//! - Model tuples, sets and the cube type
//! - Unify two types into their most specific common supertype, optionally
//!   accepting implicit dimensional conversions
//! - Answer dependency questions (`uses_dimension`, `uses_hierarchy`)

mod dimensional;
mod scalar;
mod ty;
mod unify;

pub use dimensional::{DimensionType, HierarchyType, LevelType, MemberType};
pub use scalar::{NumericType, ScalarType, UNBOUNDED_PRECISION};
pub use ty::Type;
pub use unify::{common_type, is_union_compatible};

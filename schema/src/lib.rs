//! MDX Schema
//!
//! Immutable schema lookup for dimensions, hierarchies, levels, members and
//! cubes, plus the builder that constructs it.
//!
//! Responsibilities:
//! - Allocate dense ids for every schema object
//! - Synthesize the `(All)` level, all member and null member of hierarchies
//! - Resolve parents, default members and default hierarchies by name
//! - Answer id and unique-name lookups during compilation

mod builder;
mod defs;
mod error;
mod schema;

pub use builder::{CubeBuilder, DimensionBuilder, SchemaBuilder};
pub use defs::{HierarchyDef, LevelDef, MemberDef};
pub use error::{SchemaError, SchemaResult};
pub use schema::Schema;

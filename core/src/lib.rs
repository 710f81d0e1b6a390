//! MDX Core Types
//!
//! This crate provides the foundational types used throughout the calc compiler:
//! - Identity types (DimensionId, HierarchyId, LevelId, MemberId, CubeId)
//! - OLAP schema objects (Dimension, Hierarchy, Level, Member, Cube)
//! - Runtime values (the Value enum and TupleList)

mod id;
mod olap;
mod value;

pub use id::*;
pub use olap::*;
pub use value::*;

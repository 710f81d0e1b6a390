//! Identity types for schema objects.
//!
//! All identifiers are dense 32-bit values that are:
//! - Unique within their namespace (one schema)
//! - Immutable once assigned
//! - Cheap to copy and compare, which is what the type lattice relies on

use std::fmt;

macro_rules! schema_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            pub fn raw(&self) -> u32 {
                self.0
            }

            /// Position of this id in a dense table.
            pub fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

schema_id!(
    /// Identifier for a dimension.
    DimensionId,
    "d"
);

schema_id!(
    /// Identifier for a hierarchy.
    HierarchyId,
    "h"
);

schema_id!(
    /// Identifier for a level.
    LevelId,
    "l"
);

schema_id!(
    /// Identifier for a member.
    MemberId,
    "m"
);

schema_id!(
    /// Identifier for a cube.
    CubeId,
    "c"
);

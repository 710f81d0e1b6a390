//! Dimensional types.
//!
//! Each type records what is statically known about the value it describes.
//! Fields form a specialization chain: a known member implies a known level,
//! a known level a known hierarchy, a known hierarchy a known dimension.
//! Fields are private and the constructors only accept schema objects or an
//! existing type, so the chain always agrees.

use crate::Type;
use mdx_core::{
    Dimension, DimensionId, Hierarchy, HierarchyId, Level, LevelId, Member, MemberId,
};
use std::fmt;

/// Whether a hierarchy is used, given the known dimension and hierarchy.
fn uses_hierarchy(
    dimension: Option<DimensionId>,
    hierarchy: Option<HierarchyId>,
    target: &Hierarchy,
    definitely: bool,
) -> bool {
    hierarchy == Some(target.id)
        || (!definitely
            && hierarchy.is_none()
            && (dimension.is_none() || dimension == Some(target.dimension)))
}

fn uses_dimension(dimension: Option<DimensionId>, target: DimensionId, definitely: bool) -> bool {
    dimension == Some(target) || (!definitely && dimension.is_none())
}

/// Keep a field only when both sides agree on it.
fn agree<T: PartialEq + Copy>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => Some(x),
        _ => None,
    }
}

/// The type of a member expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemberType {
    dimension: Option<DimensionId>,
    hierarchy: Option<HierarchyId>,
    level: Option<LevelId>,
    member: Option<MemberId>,
}

impl MemberType {
    /// A member of which nothing is known.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// The type of exactly this member.
    pub fn for_member(member: &Member) -> Self {
        Self {
            dimension: Some(member.dimension),
            hierarchy: Some(member.hierarchy),
            level: Some(member.level),
            member: Some(member.id),
        }
    }

    /// Any member of this level.
    pub fn for_level(level: &Level) -> Self {
        Self {
            dimension: Some(level.dimension),
            hierarchy: Some(level.hierarchy),
            level: Some(level.id),
            member: None,
        }
    }

    /// Any member of this hierarchy.
    pub fn for_hierarchy(hierarchy: &Hierarchy) -> Self {
        Self {
            dimension: Some(hierarchy.dimension),
            hierarchy: Some(hierarchy.id),
            level: None,
            member: None,
        }
    }

    /// Any member of this dimension.
    pub fn for_dimension(dimension: &Dimension) -> Self {
        Self {
            dimension: Some(dimension.id),
            ..Self::default()
        }
    }

    /// The members an expression of the given type could denote.
    ///
    /// For a level that is the level's members, for a hierarchy its members
    /// and so on. Scalars, cubes and tuples give the unknown member.
    pub fn for_type(ty: &Type) -> Self {
        Self {
            dimension: ty.dimension_id(),
            hierarchy: ty.hierarchy_id(),
            level: ty.level_id(),
            member: ty.member_id(),
        }
    }

    pub fn dimension(&self) -> Option<DimensionId> {
        self.dimension
    }

    pub fn hierarchy(&self) -> Option<HierarchyId> {
        self.hierarchy
    }

    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    pub fn member(&self) -> Option<MemberId> {
        self.member
    }

    /// Narrow to the deepest field both types agree on.
    pub fn common(&self, other: &MemberType) -> MemberType {
        if self.member.is_some() && self.member == other.member {
            *self
        } else if let Some(level) = agree(self.level, other.level) {
            MemberType {
                dimension: self.dimension,
                hierarchy: self.hierarchy,
                level: Some(level),
                member: None,
            }
        } else if let Some(hierarchy) = agree(self.hierarchy, other.hierarchy) {
            MemberType {
                dimension: self.dimension,
                hierarchy: Some(hierarchy),
                ..MemberType::default()
            }
        } else if let Some(dimension) = agree(self.dimension, other.dimension) {
            MemberType {
                dimension: Some(dimension),
                ..MemberType::default()
            }
        } else {
            MemberType::unknown()
        }
    }

    pub fn uses_dimension(&self, dimension: DimensionId, definitely: bool) -> bool {
        uses_dimension(self.dimension, dimension, definitely)
    }

    pub fn uses_hierarchy(&self, hierarchy: &Hierarchy, definitely: bool) -> bool {
        uses_hierarchy(self.dimension, self.hierarchy, hierarchy, definitely)
    }

    /// Check if a member is an instance of this type.
    pub fn matches(&self, member: &Member) -> bool {
        self.member.map_or(true, |id| id == member.id)
            && self.level.map_or(true, |id| id == member.level)
            && self.hierarchy.map_or(true, |id| id == member.hierarchy)
            && self.dimension.map_or(true, |id| id == member.dimension)
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(m) = self.member {
            write!(f, "MemberType<member={}>", m)
        } else if let Some(l) = self.level {
            write!(f, "MemberType<level={}>", l)
        } else if let Some(h) = self.hierarchy {
            write!(f, "MemberType<hierarchy={}>", h)
        } else if let Some(d) = self.dimension {
            write!(f, "MemberType<dimension={}>", d)
        } else {
            write!(f, "MemberType<>")
        }
    }
}

/// The type of a level expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LevelType {
    dimension: Option<DimensionId>,
    hierarchy: Option<HierarchyId>,
    level: Option<LevelId>,
}

impl LevelType {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn for_level(level: &Level) -> Self {
        Self {
            dimension: Some(level.dimension),
            hierarchy: Some(level.hierarchy),
            level: Some(level.id),
        }
    }

    /// Any level of this hierarchy.
    pub fn for_hierarchy(hierarchy: &Hierarchy) -> Self {
        Self {
            dimension: Some(hierarchy.dimension),
            hierarchy: Some(hierarchy.id),
            level: None,
        }
    }

    pub fn for_dimension(dimension: &Dimension) -> Self {
        Self {
            dimension: Some(dimension.id),
            ..Self::default()
        }
    }

    /// The level an expression of the given type belongs to.
    pub fn for_type(ty: &Type) -> Self {
        Self {
            dimension: ty.dimension_id(),
            hierarchy: ty.hierarchy_id(),
            level: ty.level_id(),
        }
    }

    pub fn dimension(&self) -> Option<DimensionId> {
        self.dimension
    }

    pub fn hierarchy(&self) -> Option<HierarchyId> {
        self.hierarchy
    }

    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    pub fn common(&self, other: &LevelType) -> LevelType {
        if self.level.is_some() && self.level == other.level {
            *self
        } else if let Some(hierarchy) = agree(self.hierarchy, other.hierarchy) {
            LevelType {
                dimension: self.dimension,
                hierarchy: Some(hierarchy),
                level: None,
            }
        } else if let Some(dimension) = agree(self.dimension, other.dimension) {
            LevelType {
                dimension: Some(dimension),
                ..LevelType::default()
            }
        } else {
            LevelType::unknown()
        }
    }

    pub fn uses_dimension(&self, dimension: DimensionId, definitely: bool) -> bool {
        uses_dimension(self.dimension, dimension, definitely)
    }

    pub fn uses_hierarchy(&self, hierarchy: &Hierarchy, definitely: bool) -> bool {
        uses_hierarchy(self.dimension, self.hierarchy, hierarchy, definitely)
    }

    pub fn matches(&self, level: &Level) -> bool {
        self.level.map_or(true, |id| id == level.id)
            && self.hierarchy.map_or(true, |id| id == level.hierarchy)
            && self.dimension.map_or(true, |id| id == level.dimension)
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(l) = self.level {
            write!(f, "LevelType<level={}>", l)
        } else if let Some(h) = self.hierarchy {
            write!(f, "LevelType<hierarchy={}>", h)
        } else if let Some(d) = self.dimension {
            write!(f, "LevelType<dimension={}>", d)
        } else {
            write!(f, "LevelType<>")
        }
    }
}

/// The type of a hierarchy expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HierarchyType {
    dimension: Option<DimensionId>,
    hierarchy: Option<HierarchyId>,
}

impl HierarchyType {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn for_hierarchy(hierarchy: &Hierarchy) -> Self {
        Self {
            dimension: Some(hierarchy.dimension),
            hierarchy: Some(hierarchy.id),
        }
    }

    /// Some hierarchy of this dimension.
    pub fn for_dimension(dimension: &Dimension) -> Self {
        Self {
            dimension: Some(dimension.id),
            hierarchy: None,
        }
    }

    pub fn for_type(ty: &Type) -> Self {
        Self {
            dimension: ty.dimension_id(),
            hierarchy: ty.hierarchy_id(),
        }
    }

    pub fn dimension(&self) -> Option<DimensionId> {
        self.dimension
    }

    pub fn hierarchy(&self) -> Option<HierarchyId> {
        self.hierarchy
    }

    pub fn common(&self, other: &HierarchyType) -> HierarchyType {
        if self.hierarchy.is_some() && self.hierarchy == other.hierarchy {
            *self
        } else if let Some(dimension) = agree(self.dimension, other.dimension) {
            HierarchyType {
                dimension: Some(dimension),
                hierarchy: None,
            }
        } else {
            HierarchyType::unknown()
        }
    }

    pub fn uses_dimension(&self, dimension: DimensionId, definitely: bool) -> bool {
        uses_dimension(self.dimension, dimension, definitely)
    }

    pub fn uses_hierarchy(&self, hierarchy: &Hierarchy, definitely: bool) -> bool {
        uses_hierarchy(self.dimension, self.hierarchy, hierarchy, definitely)
    }

    pub fn matches(&self, hierarchy: &Hierarchy) -> bool {
        self.hierarchy.map_or(true, |id| id == hierarchy.id)
            && self.dimension.map_or(true, |id| id == hierarchy.dimension)
    }
}

impl fmt::Display for HierarchyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = self.hierarchy {
            write!(f, "HierarchyType<hierarchy={}>", h)
        } else if let Some(d) = self.dimension {
            write!(f, "HierarchyType<dimension={}>", d)
        } else {
            write!(f, "HierarchyType<>")
        }
    }
}

/// The type of a dimension expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DimensionType {
    dimension: Option<DimensionId>,
}

impl DimensionType {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn for_dimension(dimension: &Dimension) -> Self {
        Self {
            dimension: Some(dimension.id),
        }
    }

    pub fn for_type(ty: &Type) -> Self {
        Self {
            dimension: ty.dimension_id(),
        }
    }

    pub fn dimension(&self) -> Option<DimensionId> {
        self.dimension
    }

    pub fn common(&self, other: &DimensionType) -> DimensionType {
        DimensionType {
            dimension: agree(self.dimension, other.dimension),
        }
    }

    /// A dimension expression never definitely denotes one dimension's
    /// members, but may when its dimension matches or is unknown.
    pub fn uses_dimension(&self, dimension: DimensionId, definitely: bool) -> bool {
        !definitely && (self.dimension.is_none() || self.dimension == Some(dimension))
    }

    /// A dimension may have several hierarchies, so it never definitely uses
    /// a given one.
    pub fn uses_hierarchy(&self, hierarchy: &Hierarchy, definitely: bool) -> bool {
        !definitely && (self.dimension.is_none() || self.dimension == Some(hierarchy.dimension))
    }

    pub fn matches(&self, dimension: &Dimension) -> bool {
        self.dimension.map_or(true, |id| id == dimension.id)
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension {
            Some(d) => write!(f, "DimensionType<dimension={}>", d),
            None => write!(f, "DimensionType<>"),
        }
    }
}

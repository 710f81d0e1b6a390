//! OLAP schema objects.
//!
//! Dimensions own hierarchies, hierarchies own levels, levels own members.
//! Children are held by `Arc` downward; parents are referenced by id upward,
//! so the object graph never forms a cycle and every object is cheap to share
//! between the schema, the type lattice and runtime values.
//!
//! Equality of schema objects is identity: two members are equal when their
//! ids are equal.

use crate::{CubeId, DimensionId, HierarchyId, LevelId, MemberId};
use std::fmt;
use std::sync::Arc;

/// What a dimension holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// Ordinary dimension.
    Standard,
    /// The measures dimension; its members are the cube's measures.
    Measures,
    /// Time dimension.
    Time,
}

/// What kind of member this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A member loaded from the dimension's data.
    Regular,
    /// The single member of the `(All)` level.
    All,
    /// A member of the measures dimension.
    Measure,
    /// The null member of a hierarchy. Evaluates to an empty cell.
    Null,
    /// A member defined by a formula.
    Calculated,
}

/// A member: one coordinate value within a hierarchy.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Fully qualified name, e.g. `[Store].[USA].[CA]`.
    pub unique_name: String,
    pub level: LevelId,
    pub hierarchy: HierarchyId,
    pub dimension: DimensionId,
    /// Depth of the member's level (0 for the root level).
    pub depth: u32,
    pub parent: Option<MemberId>,
    pub kind: MemberKind,
}

impl Member {
    /// Returns true if this is the hierarchy's null member.
    pub fn is_null(&self) -> bool {
        self.kind == MemberKind::Null
    }

    /// Returns true if this is the `(All)` member.
    pub fn is_all(&self) -> bool {
        self.kind == MemberKind::All
    }

    /// Returns true if this member belongs to the measures dimension.
    pub fn is_measure(&self) -> bool {
        self.kind == MemberKind::Measure
    }

    pub fn is_calculated(&self) -> bool {
        self.kind == MemberKind::Calculated
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name)
    }
}

/// A level: one depth of a hierarchy.
#[derive(Debug, Clone)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub unique_name: String,
    pub hierarchy: HierarchyId,
    pub dimension: DimensionId,
    pub depth: u32,
    /// Members of this level in their natural order.
    ///
    /// The list is shared: runtime set values built from a level hand out
    /// clones of this `Arc` instead of copying the members.
    pub members: Arc<Vec<Arc<Member>>>,
    /// Whether this is the `(All)` level.
    pub is_all: bool,
}

impl Level {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Look up a member of this level by (unqualified) name.
    pub fn member_by_name(&self, name: &str) -> Option<&Arc<Member>> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Level {}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name)
    }
}

/// A hierarchy: an ordered set of levels within a dimension.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub id: HierarchyId,
    pub name: String,
    pub unique_name: String,
    pub dimension: DimensionId,
    /// Levels ordered from the root (depth 0) downwards.
    pub levels: Vec<Arc<Level>>,
    pub all_member: Option<Arc<Member>>,
    /// The member a context starts at for this hierarchy.
    pub default_member: Option<Arc<Member>>,
    pub null_member: Arc<Member>,
}

impl Hierarchy {
    pub fn has_all(&self) -> bool {
        self.all_member.is_some()
    }

    /// The level at the given depth.
    pub fn level(&self, depth: u32) -> Option<&Arc<Level>> {
        self.levels.get(depth as usize)
    }

    pub fn level_by_name(&self, name: &str) -> Option<&Arc<Level>> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Look up a member anywhere in this hierarchy by id.
    pub fn member(&self, id: MemberId) -> Option<&Arc<Member>> {
        if self.null_member.id == id {
            return Some(&self.null_member);
        }
        self.levels
            .iter()
            .flat_map(|l| l.members.iter())
            .find(|m| m.id == id)
    }
}

impl PartialEq for Hierarchy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Hierarchy {}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name)
    }
}

/// A dimension: one axis of analysis, with one or more hierarchies.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub id: DimensionId,
    pub name: String,
    pub unique_name: String,
    pub kind: DimensionKind,
    pub hierarchies: Vec<Arc<Hierarchy>>,
    /// Explicitly declared default hierarchy, if any.
    pub default_hierarchy: Option<HierarchyId>,
}

impl Dimension {
    pub fn is_measures(&self) -> bool {
        self.kind == DimensionKind::Measures
    }

    /// The dimension's hierarchy when it has exactly one.
    ///
    /// This is what the compiler may resolve statically; a dimension with
    /// several hierarchies needs a runtime lookup.
    pub fn unique_hierarchy(&self) -> Option<&Arc<Hierarchy>> {
        match self.hierarchies.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// The hierarchy used when the dimension appears where a hierarchy is
    /// expected: the declared default, else the only hierarchy.
    pub fn default_hierarchy(&self) -> Option<&Arc<Hierarchy>> {
        match self.default_hierarchy {
            Some(id) => self.hierarchies.iter().find(|h| h.id == id),
            None => self.unique_hierarchy(),
        }
    }

    pub fn hierarchy_by_name(&self, name: &str) -> Option<&Arc<Hierarchy>> {
        self.hierarchies.iter().find(|h| h.name == name)
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Dimension {}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name)
    }
}

/// A cube: a named set of dimensions.
#[derive(Debug, Clone)]
pub struct Cube {
    pub id: CubeId,
    pub name: String,
    pub dimensions: Vec<Arc<Dimension>>,
}

impl Cube {
    pub fn dimension_by_name(&self, name: &str) -> Option<&Arc<Dimension>> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

//! The immutable Schema.

use mdx_core::{
    Cube, CubeId, Dimension, DimensionId, Hierarchy, HierarchyId, Level, LevelId, Member, MemberId,
};
use std::collections::HashMap;
use std::sync::Arc;

/// The immutable, compiled schema containing every OLAP object.
///
/// Objects are stored in dense vectors indexed by id. The schema is
/// thread-safe and can be shared across compilations via `Arc`.
#[derive(Debug, Clone)]
pub struct Schema {
    dimensions: Vec<Arc<Dimension>>,
    dimension_names: HashMap<String, DimensionId>,
    hierarchies: Vec<Arc<Hierarchy>>,
    levels: Vec<Arc<Level>>,
    members: Vec<Arc<Member>>,
    cubes: Vec<Arc<Cube>>,
    cube_names: HashMap<String, CubeId>,
    // Unique-name indexes
    member_unique_names: HashMap<String, MemberId>,
    hierarchy_unique_names: HashMap<String, HierarchyId>,
    level_unique_names: HashMap<String, LevelId>,
}

impl Schema {
    pub(crate) fn new(
        dimensions: Vec<Arc<Dimension>>,
        dimension_names: HashMap<String, DimensionId>,
        hierarchies: Vec<Arc<Hierarchy>>,
        levels: Vec<Arc<Level>>,
        members: Vec<Arc<Member>>,
        cubes: Vec<Arc<Cube>>,
        cube_names: HashMap<String, CubeId>,
    ) -> Self {
        let member_unique_names = members
            .iter()
            .map(|m| (m.unique_name.clone(), m.id))
            .collect();
        let hierarchy_unique_names = hierarchies
            .iter()
            .map(|h| (h.unique_name.clone(), h.id))
            .collect();
        let level_unique_names = levels
            .iter()
            .map(|l| (l.unique_name.clone(), l.id))
            .collect();

        Self {
            dimensions,
            dimension_names,
            hierarchies,
            levels,
            members,
            cubes,
            cube_names,
            member_unique_names,
            hierarchy_unique_names,
            level_unique_names,
        }
    }

    // ========== Id lookups ==========

    pub fn dimension(&self, id: DimensionId) -> Option<&Arc<Dimension>> {
        self.dimensions.get(id.index())
    }

    pub fn hierarchy(&self, id: HierarchyId) -> Option<&Arc<Hierarchy>> {
        self.hierarchies.get(id.index())
    }

    pub fn level(&self, id: LevelId) -> Option<&Arc<Level>> {
        self.levels.get(id.index())
    }

    pub fn member(&self, id: MemberId) -> Option<&Arc<Member>> {
        self.members.get(id.index())
    }

    pub fn cube(&self, id: CubeId) -> Option<&Arc<Cube>> {
        self.cubes.get(id.index())
    }

    // ========== Name lookups ==========

    pub fn dimension_by_name(&self, name: &str) -> Option<&Arc<Dimension>> {
        self.dimension_names
            .get(name)
            .and_then(|id| self.dimension(*id))
    }

    pub fn cube_by_name(&self, name: &str) -> Option<&Arc<Cube>> {
        self.cube_names.get(name).and_then(|id| self.cube(*id))
    }

    pub fn member_by_unique_name(&self, unique_name: &str) -> Option<&Arc<Member>> {
        self.member_unique_names
            .get(unique_name)
            .and_then(|id| self.member(*id))
    }

    pub fn hierarchy_by_unique_name(&self, unique_name: &str) -> Option<&Arc<Hierarchy>> {
        self.hierarchy_unique_names
            .get(unique_name)
            .and_then(|id| self.hierarchy(*id))
    }

    pub fn level_by_unique_name(&self, unique_name: &str) -> Option<&Arc<Level>> {
        self.level_unique_names
            .get(unique_name)
            .and_then(|id| self.level(*id))
    }

    // ========== Navigation ==========

    /// The dimension a hierarchy belongs to.
    pub fn dimension_of(&self, hierarchy: HierarchyId) -> Option<&Arc<Dimension>> {
        self.hierarchy(hierarchy)
            .and_then(|h| self.dimension(h.dimension))
    }

    /// The hierarchy of a dimension that can be resolved without context.
    pub fn unique_hierarchy_of(&self, dimension: DimensionId) -> Option<&Arc<Hierarchy>> {
        self.dimension(dimension)
            .and_then(|d| d.unique_hierarchy())
    }

    /// The parent of a member, if any.
    pub fn parent_of(&self, member: &Member) -> Option<&Arc<Member>> {
        member.parent.and_then(|id| self.member(id))
    }

    // ========== Iteration ==========

    pub fn dimensions(&self) -> impl Iterator<Item = &Arc<Dimension>> {
        self.dimensions.iter()
    }

    pub fn hierarchies(&self) -> impl Iterator<Item = &Arc<Hierarchy>> {
        self.hierarchies.iter()
    }

    pub fn levels(&self) -> impl Iterator<Item = &Arc<Level>> {
        self.levels.iter()
    }

    pub fn members(&self) -> impl Iterator<Item = &Arc<Member>> {
        self.members.iter()
    }

    pub fn cubes(&self) -> impl Iterator<Item = &Arc<Cube>> {
        self.cubes.iter()
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn hierarchy_count(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

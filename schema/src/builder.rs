//! SchemaBuilder for constructing an immutable Schema.

use crate::{HierarchyDef, Schema, SchemaError, SchemaResult};
use mdx_core::{
    Cube, CubeId, Dimension, DimensionId, DimensionKind, Hierarchy, HierarchyId, Level, LevelId,
    Member, MemberId, MemberKind,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Name of the synthesized top level of hierarchies that have an all member.
const ALL_LEVEL_NAME: &str = "(All)";

/// Name of the null member every hierarchy carries.
const NULL_MEMBER_NAME: &str = "#null";

/// Builder for constructing an immutable Schema.
///
/// Ids are dense and allocated in declaration order, so the schema can store
/// every kind of object in a plain vector indexed by id.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    dimensions: Vec<Arc<Dimension>>,
    dimension_names: HashMap<String, DimensionId>,
    hierarchies: Vec<Arc<Hierarchy>>,
    levels: Vec<Arc<Level>>,
    members: Vec<Arc<Member>>,
    cubes: Vec<Arc<Cube>>,
    cube_names: HashMap<String, CubeId>,
}

impl SchemaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension definition.
    pub fn add_dimension(&mut self, name: impl Into<String>) -> DimensionBuilder<'_> {
        DimensionBuilder {
            builder: self,
            name: name.into(),
            kind: DimensionKind::Standard,
            hierarchies: Vec::new(),
            default_hierarchy: None,
        }
    }

    /// Add a measures dimension with one flat hierarchy of measures.
    pub fn add_measures(&mut self, measures: &[&str]) -> SchemaResult<DimensionId> {
        let mut hierarchy = HierarchyDef::new("Measures").level("MeasuresLevel");
        for measure in measures {
            hierarchy = hierarchy.member(*measure);
        }
        self.add_dimension("Measures")
            .kind(DimensionKind::Measures)
            .hierarchy(hierarchy)
            .done()
    }

    /// Add a cube over previously declared dimensions.
    pub fn add_cube(&mut self, name: impl Into<String>) -> CubeBuilder<'_> {
        CubeBuilder {
            builder: self,
            name: name.into(),
            dimension_names: Vec::new(),
        }
    }

    /// Build the immutable Schema.
    pub fn build(self) -> SchemaResult<Schema> {
        Ok(Schema::new(
            self.dimensions,
            self.dimension_names,
            self.hierarchies,
            self.levels,
            self.members,
            self.cubes,
            self.cube_names,
        ))
    }

    fn next_member_id(&self) -> MemberId {
        MemberId::new(self.members.len() as u32)
    }

    /// Build one hierarchy and register all its objects.
    fn build_hierarchy(
        &mut self,
        dimension: DimensionId,
        dimension_name: &str,
        dimension_kind: DimensionKind,
        def: HierarchyDef,
    ) -> SchemaResult<Arc<Hierarchy>> {
        if def.levels.is_empty() {
            return Err(SchemaError::EmptyHierarchy(def.name));
        }

        let hierarchy_id = HierarchyId::new(self.hierarchies.len() as u32);
        let unique_name = if def.name == dimension_name {
            format!("[{}]", dimension_name)
        } else {
            format!("[{}].[{}]", dimension_name, def.name)
        };
        let regular_kind = if dimension_kind == DimensionKind::Measures {
            MemberKind::Measure
        } else {
            MemberKind::Regular
        };

        let mut levels: Vec<Arc<Level>> = Vec::new();
        let mut all_member = None;
        // Members of the level above, by name, for parent resolution.
        let mut previous: HashMap<String, Arc<Member>> = HashMap::new();

        if let Some(all_name) = &def.all_member {
            let level_id = LevelId::new(self.levels.len() as u32);
            let member = Arc::new(Member {
                id: self.next_member_id(),
                name: all_name.clone(),
                unique_name: format!("{}.[{}]", unique_name, all_name),
                level: level_id,
                hierarchy: hierarchy_id,
                dimension,
                depth: 0,
                parent: None,
                kind: MemberKind::All,
            });
            self.members.push(member.clone());
            let level = Arc::new(Level {
                id: level_id,
                name: ALL_LEVEL_NAME.to_string(),
                unique_name: format!("{}.[{}]", unique_name, ALL_LEVEL_NAME),
                hierarchy: hierarchy_id,
                dimension,
                depth: 0,
                members: Arc::new(vec![member.clone()]),
                is_all: true,
            });
            self.levels.push(level.clone());
            levels.push(level);
            previous.insert(all_name.clone(), member.clone());
            all_member = Some(member);
        }

        for level_def in def.levels {
            let depth = levels.len() as u32;
            let level_id = LevelId::new(self.levels.len() as u32);
            let mut seen = HashSet::new();
            let mut members = Vec::with_capacity(level_def.members.len());

            for member_def in level_def.members {
                if !seen.insert(member_def.name.clone()) {
                    return Err(SchemaError::duplicate_member(&level_def.name, member_def.name));
                }
                let parent = match &member_def.parent {
                    Some(parent_name) => match previous.get(parent_name) {
                        Some(parent) => Some(parent.clone()),
                        None => {
                            return Err(SchemaError::unknown_parent(
                                member_def.name,
                                parent_name.clone(),
                            ))
                        }
                    },
                    // Root members of a hierarchy with an all level hang off the all member.
                    None => all_member.clone().filter(|_| depth == 1),
                };
                let prefix = match &parent {
                    Some(p) if !p.is_all() => p.unique_name.clone(),
                    _ => unique_name.clone(),
                };
                let member = Arc::new(Member {
                    id: self.next_member_id(),
                    unique_name: format!("{}.[{}]", prefix, member_def.name),
                    name: member_def.name,
                    level: level_id,
                    hierarchy: hierarchy_id,
                    dimension,
                    depth,
                    parent: parent.map(|p| p.id),
                    kind: if member_def.calculated {
                        MemberKind::Calculated
                    } else {
                        regular_kind
                    },
                });
                self.members.push(member.clone());
                members.push(member);
            }

            previous = members.iter().map(|m| (m.name.clone(), m.clone())).collect();
            let level = Arc::new(Level {
                id: level_id,
                unique_name: format!("{}.[{}]", unique_name, level_def.name),
                name: level_def.name,
                hierarchy: hierarchy_id,
                dimension,
                depth,
                members: Arc::new(members),
                is_all: false,
            });
            self.levels.push(level.clone());
            levels.push(level);
        }

        let null_member = Arc::new(Member {
            id: self.next_member_id(),
            name: NULL_MEMBER_NAME.to_string(),
            unique_name: format!("{}.[{}]", unique_name, NULL_MEMBER_NAME),
            level: levels[0].id,
            hierarchy: hierarchy_id,
            dimension,
            depth: 0,
            parent: None,
            kind: MemberKind::Null,
        });
        self.members.push(null_member.clone());

        let default_member = match &def.default_member {
            Some(name) => {
                let found = levels
                    .iter()
                    .find_map(|l| l.member_by_name(name))
                    .cloned();
                match found {
                    Some(member) => Some(member),
                    None => return Err(SchemaError::unknown_default_member(&def.name, name.clone())),
                }
            }
            None => all_member
                .clone()
                .or_else(|| levels.iter().find_map(|l| l.members.first().cloned())),
        };

        let hierarchy = Arc::new(Hierarchy {
            id: hierarchy_id,
            name: def.name,
            unique_name,
            dimension,
            levels,
            all_member,
            default_member,
            null_member,
        });
        self.hierarchies.push(hierarchy.clone());
        Ok(hierarchy)
    }
}

/// Builder for a dimension definition.
pub struct DimensionBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    kind: DimensionKind,
    hierarchies: Vec<HierarchyDef>,
    default_hierarchy: Option<String>,
}

impl<'a> DimensionBuilder<'a> {
    /// Set the dimension kind.
    pub fn kind(mut self, kind: DimensionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a hierarchy.
    pub fn hierarchy(mut self, hierarchy: HierarchyDef) -> Self {
        self.hierarchies.push(hierarchy);
        self
    }

    /// Declare the default hierarchy by name.
    pub fn default_hierarchy(mut self, name: impl Into<String>) -> Self {
        self.default_hierarchy = Some(name.into());
        self
    }

    /// Finish building this dimension.
    pub fn done(self) -> SchemaResult<DimensionId> {
        if self.builder.dimension_names.contains_key(&self.name) {
            return Err(SchemaError::DuplicateDimensionName(self.name));
        }
        if self.hierarchies.is_empty() {
            return Err(SchemaError::EmptyDimension(self.name));
        }

        let mut names = HashSet::new();
        for def in &self.hierarchies {
            if !names.insert(def.name.clone()) {
                return Err(SchemaError::duplicate_hierarchy(&self.name, def.name.clone()));
            }
        }

        let id = DimensionId::new(self.builder.dimensions.len() as u32);
        let mut hierarchies = Vec::with_capacity(self.hierarchies.len());
        for def in self.hierarchies {
            hierarchies.push(
                self.builder
                    .build_hierarchy(id, &self.name, self.kind, def)?,
            );
        }

        let default_hierarchy = match self.default_hierarchy {
            Some(name) => match hierarchies.iter().find(|h| h.name == name) {
                Some(h) => Some(h.id),
                None => return Err(SchemaError::unknown_default_hierarchy(&self.name, name)),
            },
            None => None,
        };

        let dimension = Arc::new(Dimension {
            id,
            unique_name: format!("[{}]", self.name),
            name: self.name.clone(),
            kind: self.kind,
            hierarchies,
            default_hierarchy,
        });
        self.builder.dimension_names.insert(self.name, id);
        self.builder.dimensions.push(dimension);
        Ok(id)
    }
}

/// Builder for a cube definition.
pub struct CubeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    dimension_names: Vec<String>,
}

impl<'a> CubeBuilder<'a> {
    /// Add a dimension by name.
    pub fn dimension(mut self, name: impl Into<String>) -> Self {
        self.dimension_names.push(name.into());
        self
    }

    /// Finish building this cube.
    pub fn done(self) -> SchemaResult<CubeId> {
        if self.builder.cube_names.contains_key(&self.name) {
            return Err(SchemaError::DuplicateCubeName(self.name));
        }

        let mut dimensions = Vec::with_capacity(self.dimension_names.len());
        for name in &self.dimension_names {
            match self.builder.dimension_names.get(name) {
                Some(id) => dimensions.push(self.builder.dimensions[id.index()].clone()),
                None => return Err(SchemaError::UnknownDimension(name.clone())),
            }
        }

        let id = CubeId::new(self.builder.cubes.len() as u32);
        self.builder.cubes.push(Arc::new(Cube {
            id,
            name: self.name.clone(),
            dimensions,
        }));
        self.builder.cube_names.insert(self.name, id);
        Ok(id)
    }
}

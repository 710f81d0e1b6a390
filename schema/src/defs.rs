//! Hierarchy definitions consumed by the builder.

/// Definition of a member within a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDef {
    pub name: String,
    /// Name of the parent member in the level above.
    pub parent: Option<String>,
    pub calculated: bool,
}

impl MemberDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            calculated: false,
        }
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn calculated(mut self) -> Self {
        self.calculated = true;
        self
    }
}

/// Definition of a level and its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDef {
    pub name: String,
    pub members: Vec<MemberDef>,
}

impl LevelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}

/// Definition of a hierarchy.
///
/// Levels are declared top-down; `member`, `member_of` and
/// `calculated_member` always append to the most recently declared level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyDef {
    pub name: String,
    /// Name of the all member; `None` means the hierarchy has no `(All)` level.
    pub all_member: Option<String>,
    pub levels: Vec<LevelDef>,
    pub default_member: Option<String>,
}

impl HierarchyDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            all_member: None,
            levels: Vec::new(),
            default_member: None,
        }
    }

    pub fn with_all(mut self, all_member: impl Into<String>) -> Self {
        self.all_member = Some(all_member.into());
        self
    }

    pub fn level(mut self, name: impl Into<String>) -> Self {
        self.levels.push(LevelDef::new(name));
        self
    }

    /// Add a root member (or a member whose parent is the all member).
    pub fn member(self, name: impl Into<String>) -> Self {
        self.push_member(MemberDef::new(name))
    }

    /// Add a member under a named parent in the previous level.
    pub fn member_of(self, name: impl Into<String>, parent: impl Into<String>) -> Self {
        self.push_member(MemberDef::new(name).child_of(parent))
    }

    pub fn calculated_member(self, name: impl Into<String>) -> Self {
        self.push_member(MemberDef::new(name).calculated())
    }

    pub fn default_member(mut self, name: impl Into<String>) -> Self {
        self.default_member = Some(name.into());
        self
    }

    fn push_member(mut self, member: MemberDef) -> Self {
        if self.levels.is_empty() {
            self.levels.push(LevelDef::new(self.name.clone()));
        }
        if let Some(level) = self.levels.last_mut() {
            level.members.push(member);
        }
        self
    }
}

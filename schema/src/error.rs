//! Schema construction errors.

use thiserror::Error;

/// Errors that can occur during schema construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate dimension name: {0}")]
    DuplicateDimensionName(String),

    #[error("Duplicate hierarchy '{hierarchy}' in dimension '{dimension}'")]
    DuplicateHierarchyName { dimension: String, hierarchy: String },

    #[error("Duplicate member '{member}' in level '{level}'")]
    DuplicateMemberName { level: String, member: String },

    #[error("Unknown parent '{parent}' for member '{member}'")]
    UnknownParentMember { member: String, parent: String },

    #[error("Unknown default member '{member}' in hierarchy '{hierarchy}'")]
    UnknownDefaultMember { hierarchy: String, member: String },

    #[error("Unknown default hierarchy '{hierarchy}' in dimension '{dimension}'")]
    UnknownDefaultHierarchy { dimension: String, hierarchy: String },

    #[error("Dimension '{0}' has no hierarchies")]
    EmptyDimension(String),

    #[error("Hierarchy '{0}' has no levels")]
    EmptyHierarchy(String),

    #[error("Unknown dimension in cube: {0}")]
    UnknownDimension(String),

    #[error("Duplicate cube name: {0}")]
    DuplicateCubeName(String),
}

impl SchemaError {
    pub fn duplicate_hierarchy(dimension: impl Into<String>, hierarchy: impl Into<String>) -> Self {
        Self::DuplicateHierarchyName {
            dimension: dimension.into(),
            hierarchy: hierarchy.into(),
        }
    }

    pub fn duplicate_member(level: impl Into<String>, member: impl Into<String>) -> Self {
        Self::DuplicateMemberName {
            level: level.into(),
            member: member.into(),
        }
    }

    pub fn unknown_parent(member: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnknownParentMember {
            member: member.into(),
            parent: parent.into(),
        }
    }

    pub fn unknown_default_member(hierarchy: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownDefaultMember {
            hierarchy: hierarchy.into(),
            member: member.into(),
        }
    }

    pub fn unknown_default_hierarchy(
        dimension: impl Into<String>,
        hierarchy: impl Into<String>,
    ) -> Self {
        Self::UnknownDefaultHierarchy {
            dimension: dimension.into(),
            hierarchy: hierarchy.into(),
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

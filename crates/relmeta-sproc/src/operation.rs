//! Store operations
//!
//! Provides [`StoreOperation`], the operation kind a stored procedure maps
//! (insert, update, delete), and its derivation from [`EntityState`].

use relmeta_core::MetadataError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Operation a stored procedure performs for its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreOperation {
    /// Persist a new entity
    Insert,

    /// Persist changes to an existing entity
    Update,

    /// Delete an existing entity
    Delete,
}

impl StoreOperation {
    /// All operations in slot order
    pub const ALL: [Self; 3] = [Self::Insert, Self::Update, Self::Delete];

    /// Operation name, also used as the default-name suffix
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "Insert",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Annotation key the slot is stored under on the owner
    #[inline]
    #[must_use]
    pub const fn annotation_name(self) -> &'static str {
        match self {
            Self::Insert => "Relational:InsertStoredProcedure",
            Self::Update => "Relational:UpdateStoredProcedure",
            Self::Delete => "Relational:DeleteStoredProcedure",
        }
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreOperation {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(MetadataError::UnsupportedOperation(s.to_string())),
        }
    }
}

/// Change-tracking state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityState {
    /// Not tracked
    Detached,
    /// Tracked, unchanged
    Unchanged,
    /// Marked for deletion
    Deleted,
    /// Tracked with changes
    Modified,
    /// New, not yet persisted
    Added,
}

impl TryFrom<EntityState> for StoreOperation {
    type Error = MetadataError;

    /// Only states that issue a write map to an operation.
    fn try_from(state: EntityState) -> Result<Self, Self::Error> {
        match state {
            EntityState::Added => Ok(Self::Insert),
            EntityState::Modified => Ok(Self::Update),
            EntityState::Deleted => Ok(Self::Delete),
            EntityState::Detached | EntityState::Unchanged => {
                Err(MetadataError::UnsupportedOperation(format!("{state:?}")))
            }
        }
    }
}

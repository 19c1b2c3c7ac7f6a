//! Mutable references: branches and the repository header.

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// A named, movable pointer to a version node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name, also its file name under `branches/`.
    pub name: String,
    /// Key of the version node at the tip.
    pub tip: ObjectId,
}

impl Branch {
    pub fn new(name: impl Into<String>, tip: ObjectId) -> Self {
        Self {
            name: name.into(),
            tip,
        }
    }

    /// The same branch moved to `tip`.
    pub fn advanced_to(&self, tip: ObjectId) -> Self {
        Self::new(self.name.clone(), tip)
    }
}

/// Repository-wide settings that change over time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Author recorded on new commits.
    pub author: String,
    /// Name of the checked-out branch.
    pub current_branch: String,
}

impl Header {
    pub fn new(author: impl Into<String>, current_branch: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            current_branch: current_branch.into(),
        }
    }

    pub fn with_author(&self, author: impl Into<String>) -> Self {
        Self::new(author, self.current_branch.clone())
    }

    pub fn on_branch(&self, branch: impl Into<String>) -> Self {
        Self::new(self.author.clone(), branch)
    }
}

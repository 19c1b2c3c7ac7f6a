//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! metadata_dir = ".liteVCS"
//! default_author = "Unknown"
//! initial_branch = "master"
//! initial_commit_message = "Initial commit"
//! initial_commit_author = "lVCS"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use lvcs_store::{RepositorySeed, DEFAULT_METADATA_DIR};

use crate::error::{VcsError, VcsResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    /// Name of the metadata directory inside the working copy.
    pub metadata_dir: String,
    /// Author written into the header by `init`.
    pub default_author: String,
    /// Branch created by `init`.
    pub initial_branch: String,
    pub initial_commit_message: String,
    pub initial_commit_author: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            metadata_dir: DEFAULT_METADATA_DIR.into(),
            default_author: "Unknown".into(),
            initial_branch: "master".into(),
            initial_commit_message: "Initial commit".into(),
            initial_commit_author: "lVCS".into(),
        }
    }
}

impl VcsConfig {
    pub fn from_toml_str(text: &str) -> VcsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| VcsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file.
    pub fn load(path: &Path) -> VcsResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| VcsError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> VcsResult<String> {
        toml::to_string(self).map_err(|e| VcsError::Config(e.to_string()))
    }

    /// Values `init` seeds a new repository with.
    pub fn seed(&self) -> RepositorySeed {
        RepositorySeed {
            initial_branch: self.initial_branch.clone(),
            author: self.default_author.clone(),
            initial_commit_message: self.initial_commit_message.clone(),
            initial_commit_author: self.initial_commit_author.clone(),
        }
    }

    fn validate(&self) -> VcsResult<()> {
        let dir = self.metadata_dir.as_str();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains(|c: char| c == '/' || c == '\\') {
            return Err(VcsError::Config(format!(
                "metadata_dir must be a single directory name, got {dir:?}"
            )));
        }
        crate::repository::validate_branch_name(&self.initial_branch)
            .map_err(|e| VcsError::Config(format!("initial_branch: {e}")))
    }
}

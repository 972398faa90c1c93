use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const IN_MEMORY_STORE: &str = ":memory:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite file; relative paths resolve against the workspace.
    /// `":memory:"` keeps everything in process.
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_store_path() -> String {
    "mentalcare.db".into()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY_STORE.into(),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_STORE
    }

    /// Absolute database path, or `None` for the in-memory store.
    pub fn resolve_path(&self, workspace_dir: &Path) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        let path = PathBuf::from(&self.path);
        Some(if path.is_absolute() {
            path
        } else {
            workspace_dir.join(path)
        })
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.path.trim().is_empty(), "store.path must not be empty");
        ensure!(
            self.max_connections > 0,
            "store.max_connections must be positive"
        );
        Ok(())
    }
}

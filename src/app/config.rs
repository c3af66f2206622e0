use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration, loadable from a JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// File extensions treated as source units (without the dot)
    pub source_extensions: Vec<String>,
    /// Descend into dot-directories and read dot-files
    pub include_hidden: bool,
    pub follow_links: bool,
    /// Test runner executable
    pub test_command: String,
    /// Test directory, relative to the source root unless absolute
    pub test_dir: PathBuf,
    /// Oracle argv; empty means no oracle
    pub oracle_command: Vec<String>,
    /// Number of nodes requested from the oracle
    pub top_n: usize,
    /// Neighborhood radius used to refine ranked nodes
    pub context_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec!["py".to_string()],
            include_hidden: false,
            follow_links: false,
            test_command: "pytest".to_string(),
            test_dir: PathBuf::from("tests"),
            oracle_command: Vec::new(),
            top_n: 5,
            context_depth: 1,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Test directory resolved against the source root
    pub fn resolved_test_dir(&self, root: &Path) -> PathBuf {
        if self.test_dir.is_absolute() {
            self.test_dir.clone()
        } else {
            root.join(&self.test_dir)
        }
    }
}

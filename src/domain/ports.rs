use crate::domain::error::{ExtractError, OracleError};
use crate::domain::extraction::Extraction;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Source tree port (implemented by Infrastructure)
///
/// Paths are relative to the tree root.
pub trait SourceTree {
    /// Name used as the identity of the root directory node
    fn root_name(&self) -> &str;

    /// Source files in traversal order
    fn source_files(&self) -> Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> Result<String>;

    fn write(&self, path: &Path, content: &str) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Syntax extractor port: one source unit in, one flat record out
pub trait SyntaxExtractor {
    fn extract(&self, source: &str) -> Result<Extraction, ExtractError>;
}

/// A node identity scored by the relevance oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    pub identity: String,
    pub score: f64,
}

/// External relevance oracle: prompt in, free text out
pub trait RankingOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Result of one external test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub passed: bool,
    pub message: String,
    pub stdout: String,
    pub stderr: String,
}

impl TestOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// External test runner port
pub trait TestRunner {
    /// Run the whole configured test directory
    fn validate_changes(&self) -> TestOutcome;

    /// Run one test file
    fn validate_specific_test(&self, test_file: &Path) -> TestOutcome;
}

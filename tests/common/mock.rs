//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use repo_graph::domain::error::{ExtractError, OracleError};
use repo_graph::domain::extraction::Extraction;
use repo_graph::domain::ports::{
    RankingOracle, SourceTree, SyntaxExtractor, TestOutcome, TestRunner,
};

/// In-memory source tree; files are listed in insertion order.
pub struct MockSourceTree {
    root_name: String,
    files: RefCell<Vec<(PathBuf, String)>>,
}

impl MockSourceTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            files: RefCell::new(Vec::new()),
        }
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let content = content.into();
        let mut files = self.files.borrow_mut();
        match files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => files.push((path, content)),
        }
    }
}

impl SourceTree for MockSourceTree {
    fn root_name(&self) -> &str {
        &self.root_name
    }

    fn source_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.borrow().iter().map(|(p, _)| p.clone()).collect())
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.files
            .borrow()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| anyhow!("File not found: {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.add_file(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().iter().any(|(p, _)| p == path)
    }
}

/// Extractor that always reports a syntax error.
pub struct FailingExtractor;

impl SyntaxExtractor for FailingExtractor {
    fn extract(&self, _source: &str) -> Result<Extraction, ExtractError> {
        Err(ExtractError::Syntax { line: 1, column: 0 })
    }
}

/// Oracle that answers every prompt with the same text and remembers the prompt.
pub struct MockOracle {
    pub response: String,
    pub last_prompt: RefCell<Option<String>>,
}

impl MockOracle {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            last_prompt: RefCell::new(None),
        }
    }
}

impl RankingOracle for MockOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        *self.last_prompt.borrow_mut() = Some(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// Test runner with a fixed verdict that records what it was asked to run.
pub struct MockTestRunner {
    pub passed: bool,
    pub requested: RefCell<Vec<Option<PathBuf>>>,
}

impl MockTestRunner {
    pub fn new(passed: bool) -> Self {
        Self {
            passed,
            requested: RefCell::new(Vec::new()),
        }
    }

    fn outcome(&self) -> TestOutcome {
        TestOutcome {
            passed: self.passed,
            message: if self.passed { "passed" } else { "failed" }.to_string(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl TestRunner for MockTestRunner {
    fn validate_changes(&self) -> TestOutcome {
        self.requested.borrow_mut().push(None);
        self.outcome()
    }

    fn validate_specific_test(&self, test_file: &Path) -> TestOutcome {
        self.requested.borrow_mut().push(Some(test_file.to_path_buf()));
        self.outcome()
    }
}

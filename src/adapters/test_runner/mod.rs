//! External test execution.
//!
//! Only the exit status is interpreted; captured output is surfaced for
//! diagnostics.

use crate::domain::ports::{TestOutcome, TestRunner};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Runs `<command> <target>` as a child process
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    command: String,
    test_dir: PathBuf,
}

impl CommandTestRunner {
    pub fn new(command: impl Into<String>, test_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            test_dir: test_dir.into(),
        }
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    fn run(&self, target: &Path, label: &str) -> TestOutcome {
        info!("Running {} using {} on {}", label, self.command, target.display());
        let output = match Command::new(&self.command).arg(target).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let message = format!("{} is not installed or not found in PATH", self.command);
                warn!("{}", message);
                return TestOutcome::failed(message);
            }
            Err(e) => {
                let message = format!("Failed to run {}: {}", self.command, e);
                warn!("{}", message);
                return TestOutcome::failed(message);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        info!("Test output:\n{}", stdout);
        if !stderr.is_empty() {
            info!("Test errors:\n{}", stderr);
        }

        let passed = output.status.success();
        let message = if passed {
            format!("{} passed", label)
        } else {
            format!("{} failed ({})", label, output.status)
        };
        info!("{}", message);
        TestOutcome {
            passed,
            message,
            stdout,
            stderr,
        }
    }
}

impl TestRunner for CommandTestRunner {
    fn validate_changes(&self) -> TestOutcome {
        if !self.test_dir.exists() {
            let message = format!("Test directory '{}' does not exist", self.test_dir.display());
            warn!("{}", message);
            return TestOutcome::failed(message);
        }
        self.run(&self.test_dir, "Regression tests")
    }

    fn validate_specific_test(&self, test_file: &Path) -> TestOutcome {
        if !test_file.exists() {
            let message = format!("Test file '{}' does not exist", test_file.display());
            warn!("{}", message);
            return TestOutcome::failed(message);
        }
        self.run(test_file, &format!("Test {}", test_file.display()))
    }
}

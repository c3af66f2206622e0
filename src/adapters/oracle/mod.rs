//! Relevance oracle adapters.
//!
//! The oracle itself (typically a language model behind some CLI) is an external
//! program; this module only speaks to it over stdin/stdout and parses its answer.

mod parser;

pub use parser::parse_ranked_response;

use crate::domain::error::OracleError;
use crate::domain::ports::RankingOracle;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Runs an external program with the prompt on stdin; stdout is the response
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv-style list; `None` when the list is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl RankingOracle for CommandOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        debug!("Invoking oracle {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OracleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread so an oracle that answers while still
        // reading cannot fill stdout and stall the writer
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(prompt.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("oracle stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        match written {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

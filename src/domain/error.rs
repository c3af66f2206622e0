use thiserror::Error;

/// Failure to turn one source unit into an extraction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to load grammar: {0}")]
    Language(String),
    #[error("parser produced no tree")]
    Parse,
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: u32, column: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
}

/// Failure talking to the relevance-ranking oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no oracle command configured")]
    NotConfigured,
    #[error("failed to start oracle '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("oracle i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("oracle exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

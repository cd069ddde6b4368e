use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from data source")]
    Json(#[from] serde_json::Error),

    #[error("unexpected batch shape: {0}")]
    Shape(String),

    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    Utf8 {
        program: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("unknown subject {0}")]
    UnknownSubject(String),
}

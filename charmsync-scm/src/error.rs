use std::path::PathBuf;

use thiserror::Error;

/// Error surface for fetching charm repositories.
#[derive(Debug, Error)]
pub enum ScmError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{binary}` not found on PATH: {source}")]
    BinaryNotFound {
        binary: &'static str,
        #[source]
        source: which::Error,
    },

    #[error("{path} is not clean. Please commit local changes")]
    Dirty { path: PathBuf },

    #[error("`{command}` failed ({status}): {output}")]
    Command {
        command: String,
        status: String,
        output: String,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ScmError {
    ScmError::Io {
        path: path.into(),
        source,
    }
}

//! Error types for charmsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from manifest operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure (permission denied, unreadable file, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error on load, with the manifest path for context.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No `charmsync.json` in the working directory.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// A required value is empty.
    #[error("manifest entry '{entry}' is missing required value '{field}'")]
    Invalid { entry: String, field: &'static str },
}

//! Domain types for the charm manifest and the sync plan derived from it.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Manifest types deserialize from `charmsync.json` via serde + serde_json.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a charm or one of its dependencies.
///
/// The name doubles as the checkout directory name under its work dir.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CharmName(pub String);

impl fmt::Display for CharmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CharmName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CharmName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Revision-control system a repository is fetched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScmKind {
    #[default]
    #[serde(rename = "git")]
    Git,
    #[serde(rename = "bzr")]
    Bazaar,
}

impl ScmKind {
    /// Name of the metadata directory suffix / executable (`git`, `bzr`).
    pub fn as_str(self) -> &'static str {
        match self {
            ScmKind::Git => "git",
            ScmKind::Bazaar => "bzr",
        }
    }
}

impl fmt::Display for ScmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How file equality is decided when both trees hold a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintMode {
    /// Compare SHA-512 digests of the full content.
    #[default]
    ContentHash,
    /// Compare byte sizes only. Same-size edits go unnoticed.
    SizeOnly,
}

impl FingerprintMode {
    pub fn hashes_content(self) -> bool {
        matches!(self, FingerprintMode::ContentHash)
    }
}

impl fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintMode::ContentHash => write!(f, "content-hash"),
            FingerprintMode::SizeOnly => write!(f, "size-only"),
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest structs
// ---------------------------------------------------------------------------

/// A repository the manifest knows how to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepoSpec {
    #[serde(default, alias = "Scm")]
    pub scm: ScmKind,
    #[serde(default, alias = "Url")]
    pub url: String,
    /// Empty means "latest".
    #[serde(default, alias = "Revision")]
    pub revision: String,
    #[serde(default, alias = "Name")]
    pub name: CharmName,
}

/// A third-party repository whose resources are copied into the charm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dependency {
    #[serde(flatten)]
    pub repo: RepoSpec,
    /// Paths inside the dependency checkout to copy.
    #[serde(default, alias = "Resources")]
    pub resources: Vec<PathBuf>,
    /// Directory inside the staged charm the resources land in.
    #[serde(default, alias = "Destination")]
    pub destination: PathBuf,
}

/// Root of `charmsync.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(flatten)]
    pub repo: RepoSpec,
    /// Upstream branch; always fetched with bzr at its latest revision.
    #[serde(default, alias = "Upstream")]
    pub upstream: String,
    #[serde(default, alias = "Dependencies")]
    pub dependencies: Vec<Dependency>,
}

// ---------------------------------------------------------------------------
// Sync plan
// ---------------------------------------------------------------------------

/// One source/destination pair to reconcile, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPair {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub excludes: Vec<String>,
    pub mode: FingerprintMode,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

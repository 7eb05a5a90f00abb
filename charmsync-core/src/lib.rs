//! charmsync core library — manifest model, sync plan, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, manifest structs, [`FingerprintMode`]
//! - [`error`] — [`ManifestError`]
//! - [`manifest`] — load / validate / plan

pub mod error;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use manifest::{default_excludes, MANIFEST_FILE};
pub use types::{
    CharmName, Dependency, FingerprintMode, Manifest, RepoSpec, ScmKind, SyncPair,
};

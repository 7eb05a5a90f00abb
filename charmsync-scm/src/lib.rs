//! Revision-control fetch for charm repositories.
//!
//! Each repository is driven through its VCS executable (`git` or `bzr`);
//! [`fetch_all`] brings the upstream branch, the development repository and
//! every dependency named in a [`charmsync_core::Manifest`] up to date.

mod command;
mod error;
pub mod bzr;
pub mod fetch;
pub mod git;
pub mod repository;

pub use bzr::{Bazaar, BzrScm};
pub use error::ScmError;
pub use fetch::{fetch_all, fetch_plan, fetch_with, handler_for, FetchStage, FetchStep};
pub use git::{Git, GitScm};
pub use repository::{Checkout, Repository, ScmHandler, Vcs};

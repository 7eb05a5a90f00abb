use std::ffi::OsString;

use crate::repository::{Checkout, Repository, Vcs};

/// Bazaar command lines. The checkout path is always the last argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bazaar;

pub type BzrScm = Repository<Bazaar>;

fn on_checkout(checkout: &Checkout, leading: &[&str]) -> Vec<OsString> {
    let mut args: Vec<OsString> = leading.iter().map(OsString::from).collect();
    args.push(checkout.full_path().into());
    args
}

impl Vcs for Bazaar {
    const BINARY: &'static str = "bzr";

    fn clone_args(checkout: &Checkout) -> Vec<OsString> {
        vec![
            OsString::from("branch"),
            checkout.url.clone().into(),
            checkout.full_path().into(),
        ]
    }

    fn status_args(checkout: &Checkout) -> Vec<OsString> {
        on_checkout(checkout, &["status"])
    }

    fn revision_steps(checkout: &Checkout) -> Vec<Vec<OsString>> {
        if checkout.revision.is_empty() {
            vec![on_checkout(checkout, &["revert"])]
        } else {
            vec![on_checkout(checkout, &["revert", "-r", checkout.revision.as_str()])]
        }
    }
}

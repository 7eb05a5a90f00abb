use std::ffi::OsString;

use crate::repository::{Checkout, Repository, Vcs};

/// Git command lines. Every command after the clone runs with `-C <checkout>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

pub type GitScm = Repository<Git>;

fn in_checkout(checkout: &Checkout, rest: &[&str]) -> Vec<OsString> {
    let mut args = vec![OsString::from("-C"), checkout.full_path().into()];
    args.extend(rest.iter().map(OsString::from));
    args
}

impl Vcs for Git {
    const BINARY: &'static str = "git";

    fn clone_args(checkout: &Checkout) -> Vec<OsString> {
        vec![
            OsString::from("clone"),
            checkout.url.clone().into(),
            checkout.full_path().into(),
        ]
    }

    fn status_args(checkout: &Checkout) -> Vec<OsString> {
        in_checkout(checkout, &["status", "-s"])
    }

    fn revision_steps(checkout: &Checkout) -> Vec<Vec<OsString>> {
        let mut steps = vec![
            in_checkout(checkout, &["checkout", "master"]),
            in_checkout(checkout, &["pull"]),
        ];
        if !checkout.revision.is_empty() {
            steps.push(in_checkout(checkout, &["checkout", checkout.revision.as_str()]));
        }
        steps
    }
}

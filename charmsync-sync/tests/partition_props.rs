use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use charmsync_core::FingerprintMode;
use charmsync_sync::{diff, Fingerprint, PathEntry, TreeSnapshot};
use proptest::prelude::*;

fn entry() -> impl Strategy<Value = PathEntry> {
    prop_oneof![
        4 => "[ab]{0,3}".prop_map(|content| PathEntry::file(
            content.len() as u64,
            Some(Fingerprint::of_bytes(content.as_bytes())),
        )),
        1 => Just(PathEntry::dir()),
        1 => Just(PathEntry::symlink()),
    ]
}

fn snapshot() -> impl Strategy<Value = BTreeMap<PathBuf, PathEntry>> {
    prop::collection::btree_map("[a-e]{1,2}".prop_map(PathBuf::from), entry(), 0..12)
}

fn any_mode() -> impl Strategy<Value = FingerprintMode> {
    prop_oneof![Just(FingerprintMode::ContentHash), Just(FingerprintMode::SizeOnly)]
}

proptest! {
    #[test]
    fn every_key_lands_in_exactly_one_set(
        source in snapshot(),
        destination in snapshot(),
        mode in any_mode(),
    ) {
        let src: TreeSnapshot = source.clone().into_iter().collect();
        let dst: TreeSnapshot = destination.clone().into_iter().collect();
        let ops = diff(&src, &dst, mode);

        let union: BTreeSet<&PathBuf> = source.keys().chain(destination.keys()).collect();
        prop_assert_eq!(ops.len(), union.len());
        for key in union {
            let hits = [
                ops.delete.contains(key),
                ops.create.contains_key(key),
                ops.update.contains_key(key),
                ops.skip.contains(key),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            prop_assert_eq!(hits, 1, "{:?} classified {} times", key, hits);
        }
    }

    #[test]
    fn destination_only_keys_are_always_deleted(
        source in snapshot(),
        destination in snapshot(),
        mode in any_mode(),
    ) {
        let src: TreeSnapshot = source.clone().into_iter().collect();
        let dst: TreeSnapshot = destination.clone().into_iter().collect();
        let ops = diff(&src, &dst, mode);

        for key in destination.keys().filter(|k| !source.contains_key(*k)) {
            prop_assert!(ops.delete.contains(key));
        }
        for key in &ops.delete {
            prop_assert!(!source.contains_key(key));
        }
    }

    #[test]
    fn content_hash_never_skips_differing_files(
        source in snapshot(),
        destination in snapshot(),
    ) {
        let src: TreeSnapshot = source.clone().into_iter().collect();
        let dst: TreeSnapshot = destination.clone().into_iter().collect();
        let ops = diff(&src, &dst, FingerprintMode::ContentHash);

        for (key, s) in &source {
            if let Some(d) = destination.get(key) {
                if s.is_regular_file() && d.is_regular_file() && s.fingerprint != d.fingerprint {
                    prop_assert!(ops.update.contains_key(key));
                }
            }
        }
    }

    #[test]
    fn diff_against_itself_is_a_noop(source in snapshot(), mode in any_mode()) {
        let src: TreeSnapshot = source.into_iter().collect();
        let ops = diff(&src, &src, mode);
        prop_assert!(ops.is_noop());
        prop_assert_eq!(ops.skip.len(), src.len());
    }
}

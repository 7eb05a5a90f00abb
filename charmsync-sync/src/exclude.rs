//! Exclusion matching over root-relative paths.
//!
//! Patterns are unanchored regular expressions combined with logical OR.
//! The matcher renders paths itself (components joined with `/`), so the
//! source and destination walks always test the same string for the same
//! relative path.

use std::path::{Component, Path};

use regex::RegexSet;

use crate::error::SyncError;

/// Compiled, immutable set of exclusion patterns.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    set: RegexSet,
}

impl ExclusionMatcher {
    /// Compile `patterns` into one matcher.
    ///
    /// The first malformed pattern fails the build with [`SyncError::Config`].
    pub fn build<I, S>(patterns: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        for pattern in &patterns {
            if let Err(source) = regex::Regex::new(pattern) {
                return Err(SyncError::Config {
                    pattern: pattern.clone(),
                    source,
                });
            }
        }
        let set = RegexSet::new(&patterns).map_err(|source| SyncError::Config {
            pattern: patterns.join("|"),
            source,
        })?;
        Ok(Self { set })
    }

    /// A matcher that excludes nothing.
    pub fn empty() -> Self {
        Self {
            set: RegexSet::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Whether `relative` (a path below a tree root) is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        self.set.is_match(&render(relative))
    }
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

/// `a/b/c` regardless of platform separator.
pub(crate) fn render(relative: &Path) -> String {
    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_list_excludes_nothing() {
        let matcher = ExclusionMatcher::build(Vec::<String>::new()).unwrap();
        assert!(matcher.is_empty());
        assert!(!matcher.is_excluded(Path::new(".git/config")));
        assert!(!matcher.is_excluded(Path::new("anything")));
    }

    #[test]
    fn any_pattern_match_excludes() {
        let matcher = ExclusionMatcher::build([r".*\.git.*", r".*\.bzr.*"]).unwrap();
        assert!(matcher.is_excluded(Path::new(".git")));
        assert!(matcher.is_excluded(Path::new(".git/config")));
        assert!(matcher.is_excluded(Path::new("nested/.bzr/branch")));
        assert!(!matcher.is_excluded(Path::new("hooks/install")));
    }

    #[test]
    fn patterns_are_unanchored() {
        let matcher = ExclusionMatcher::build(["tmp"]).unwrap();
        assert!(matcher.is_excluded(Path::new("a/tmpfile")));
        assert!(matcher.is_excluded(Path::new("tmp")));
        assert!(!matcher.is_excluded(Path::new("a/tm/p")));
    }

    #[test]
    fn anchors_apply_to_relative_path() {
        let matcher = ExclusionMatcher::build(["^build/"]).unwrap();
        assert!(matcher.is_excluded(Path::new("build/out.o")));
        assert!(!matcher.is_excluded(Path::new("src/build/out.o")));
    }

    #[test]
    fn malformed_pattern_is_config_error() {
        let err = ExclusionMatcher::build([r".*\.git.*", "(unclosed"]).unwrap_err();
        match err {
            SyncError::Config { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn render_joins_with_forward_slash() {
        let path: std::path::PathBuf = ["a", "b", "c.txt"].iter().collect();
        assert_eq!(render(&path), "a/b/c.txt");
    }
}

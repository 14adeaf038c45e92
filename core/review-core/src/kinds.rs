//! The hook-kind registry.
//!
//! Six reviewer hooks share one pipeline; everything that differs between
//! them is a property of [`HookKind`].

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    TestCoverage,
    Lint,
    File,
    Bug,
    Docs,
    Security,
}

impl HookKind {
    pub const ALL: [HookKind; 6] = [
        HookKind::TestCoverage,
        HookKind::Lint,
        HookKind::File,
        HookKind::Bug,
        HookKind::Docs,
        HookKind::Security,
    ];

    /// Stable name used on the command line and in state/log paths.
    pub fn slug(self) -> &'static str {
        match self {
            HookKind::TestCoverage => "test-coverage",
            HookKind::Lint => "lint",
            HookKind::File => "file",
            HookKind::Bug => "bug",
            HookKind::Docs => "docs",
            HookKind::Security => "security",
        }
    }

    /// Key of this kind's section in a settings document.
    pub fn config_key(self) -> &'static str {
        match self {
            HookKind::TestCoverage => "testCoverageReviewer",
            HookKind::Lint => "lintReviewer",
            HookKind::File => "fileReviewer",
            HookKind::Bug => "bugReviewer",
            HookKind::Docs => "docsReviewer",
            HookKind::Security => "securityReviewer",
        }
    }

    /// Appended to title- and directory-derived queue ids.
    pub fn queue_suffix(self) -> &'static str {
        match self {
            HookKind::TestCoverage => "-qa",
            HookKind::Lint => "-lint",
            HookKind::File => "-dev",
            HookKind::Bug => "-bugfixes",
            HookKind::Docs => "-docs",
            HookKind::Security => "-security",
        }
    }

    /// Last-resort queue id when nothing else resolves.
    pub fn default_queue_id(self) -> &'static str {
        match self {
            HookKind::TestCoverage => "test-coverage-qa",
            HookKind::Lint => "lint-review",
            HookKind::File => "file-review-dev",
            HookKind::Bug => "bug-review-bugfixes",
            HookKind::Docs => "docs-review",
            HookKind::Security => "security-review",
        }
    }

    /// What the deep review should look for. Interpolated into the prompt.
    pub fn review_focus(self) -> &'static str {
        match self {
            HookKind::TestCoverage => {
                "Find behavior in these files that has no test exercising it. \
                 For each gap, describe the missing test case and where it belongs."
            }
            HookKind::Lint => {
                "Look for style drift, dead code, unused imports, suspicious casts \
                 and anything the project's linters would flag."
            }
            HookKind::File => {
                "Check file-level hygiene: misplaced modules, files that grew too \
                 large, duplicated helpers and naming that does not match the project."
            }
            HookKind::Bug => {
                "Hunt for bugs: off-by-one errors, unhandled error paths, race \
                 conditions, incorrect edge-case handling and broken invariants."
            }
            HookKind::Docs => {
                "Find public items whose documentation is missing, stale or wrong \
                 after these edits, including README and usage examples."
            }
            HookKind::Security => {
                "Audit for security issues: injection, unsafe deserialization, \
                 secrets in code, missing input validation and path traversal."
            }
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for HookKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| {
                let known: Vec<_> = HookKind::ALL.iter().map(|k| k.slug()).collect();
                format!("unknown hook kind '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize;

    #[test]
    fn test_slug_round_trips_through_from_str() {
        for kind in HookKind::ALL {
            assert_eq!(kind.slug().parse::<HookKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind_lists_known_kinds() {
        let err = "perf".parse::<HookKind>().unwrap_err();
        assert!(err.contains("test-coverage"));
        assert!(err.contains("security"));
    }

    #[test]
    fn test_default_queue_ids_are_already_sanitized() {
        for kind in HookKind::ALL {
            assert_eq!(
                sanitize::queue_id(kind.default_queue_id()).as_deref(),
                Some(kind.default_queue_id())
            );
        }
    }
}

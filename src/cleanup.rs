//! Temp directory cleanup.
//!
//! Removes the entries of a single directory whose file name matches a shell-style
//! wildcard. Failures are reported back to the caller instead of being dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

/// Directory cleaned when none is configured.
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("failed to list {}: {source}", dir.display())]
    List { dir: PathBuf, source: io::Error },
    #[error("failed to remove {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
    /// Every wildcard escapes to a valid regex, so this only fires on a translation bug.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// What to do when removing one entry fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Record the failure and keep going.
    #[default]
    ContinueOnError,
    /// Stop at the first failure and return it.
    FailFast,
}

#[derive(Debug)]
pub struct RemoveFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of one cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Entries left alone because their name did not match.
    pub skipped: usize,
    pub failures: Vec<RemoveFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct TempFileCleaner {
    dir: PathBuf,
    policy: CleanupPolicy,
}

impl Default for TempFileCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_DIR)
    }
}

impl TempFileCleaner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            policy: CleanupPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CleanupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove every entry in the directory whose file name matches `pattern`.
    ///
    /// `*` matches any run of characters and `?` exactly one; everything else is
    /// literal. An empty pattern matches everything. Directories are removed only
    /// when empty, there is no recursion.
    pub fn delete_temp_files(&self, pattern: &str) -> Result<CleanupReport, CleanupError> {
        let matcher = wildcard_regex(pattern)?;
        let entries = fs::read_dir(&self.dir).map_err(|source| CleanupError::List {
            dir: self.dir.clone(),
            source,
        })?;

        let mut report = CleanupReport::default();
        for entry in entries {
            let entry = entry.map_err(|source| CleanupError::List {
                dir: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !matcher.is_match(&entry.file_name().to_string_lossy()) {
                report.skipped += 1;
                continue;
            }

            match remove_entry(&entry) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed temp entry");
                    report.removed.push(path);
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "failed to remove temp entry");
                    if self.policy == CleanupPolicy::FailFast {
                        return Err(CleanupError::Remove {
                            path,
                            source: error,
                        });
                    }
                    report.failures.push(RemoveFailure { path, error });
                }
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            pattern,
            removed = report.removed.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            "temp cleanup finished"
        );
        Ok(report)
    }
}

fn remove_entry(entry: &fs::DirEntry) -> io::Result<()> {
    if entry.file_type()?.is_dir() {
        fs::remove_dir(entry.path())
    } else {
        fs::remove_file(entry.path())
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex, CleanupError> {
    // `(?s)` so `*` and `?` also match a newline inside a file name.
    let mut re = String::from("^(?s)");
    if pattern.is_empty() {
        re.push_str(".*");
    }
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|source| CleanupError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

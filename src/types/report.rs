//! Non-fatal findings collected during a run.
//!
//! These never abort anything. They are aggregated and shown in the final
//! report so a user can see what was left out and why.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Why the scanner left an entry out of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// File exceeds the configured size ceiling; never read
    Oversized { size: u64, limit: u64 },
    /// Permission denied, race-deleted, or other I/O failure
    Unreadable { error: String },
    /// Content contains NUL bytes
    Binary,
    /// Symlink not followed
    Symlink,
    /// Directory already visited through another path
    SymlinkCycle,
    /// Directory deeper than the configured limit
    DepthLimit { depth: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversized { size, limit } => {
                write!(f, "oversized ({} bytes, limit {})", size, limit)
            }
            Self::Unreadable { error } => write!(f, "unreadable: {}", error),
            Self::Binary => write!(f, "binary content"),
            Self::Symlink => write!(f, "symlink not followed"),
            Self::SymlinkCycle => write!(f, "symlink cycle"),
            Self::DepthLimit { depth } => write!(f, "depth limit reached at {}", depth),
        }
    }
}

/// A file or directory skipped by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Dependency extraction was degraded or abandoned for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub path: String,
    pub message: String,
    /// True when a fallback produced a result, false when nothing was extracted
    pub degraded: bool,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.degraded { "degraded" } else { "failed" };
        write!(f, "{} ({}): {}", self.path, kind, self.message)
    }
}

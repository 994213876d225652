pub mod file_scanner;
pub mod ignore_rules;

use std::path::Path;

pub use file_scanner::{FileScanner, ScanReport};
pub use ignore_rules::IgnoreRules;

use crate::types::Result;

/// Scan `root` with default settings plus `ignore_patterns`
pub fn scan(root: impl AsRef<Path>, ignore_patterns: &[String]) -> Result<ScanReport> {
    FileScanner::new(root)
        .with_ignore(ignore_patterns.to_vec())
        .scan()
}

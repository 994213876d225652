pub mod error;
pub mod record;
pub mod report;

pub use error::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use record::{FileRecord, Manifest};
pub use report::{ExtractionWarning, ScanWarning, SkipReason};

//! Code Analyzer Module
//!
//! - Repository scanning with ignore rules and skip reporting
//! - Language detection by extension
//! - Per-language dependency extraction

pub mod extractor;
pub mod language;
pub mod scanner;

pub use language::Language;

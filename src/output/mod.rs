//! Output Module
//! - Companion docs, overview and dependency document on disk
//! - Run manifest for later discovery
//! - Optional Docusaurus site

pub mod assembler;
pub mod links;
pub mod manifest;
pub mod site;
pub mod tree;

pub use assembler::{AssemblyReport, OutputAssembler, WrittenDoc};
pub use manifest::{FileEntry, RunManifest};
pub use site::{SiteGenerator, SiteReport, default_site_dir};

//! repodoc - LLM-driven repository documentation generator
//!
//! Scans a repository, extracts per-file dependencies, and asks an LLM for a
//! companion document per source file, a project overview and a dependency
//! narrative. The result is a markdown tree mirroring the source layout,
//! optionally published as a Docusaurus site.
//!
//! ## Quick Start
//!
//! ```ignore
//! use repodoc::{Config, DocPipeline};
//!
//! let outcome = DocPipeline::new("path/to/repo", Config::default()).run().await?;
//! println!("{} of {} files documented", outcome.summary.succeeded(), outcome.summary.total());
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: scanning, language detection, dependency extraction
//! - [`graph`]: forward/reverse dependency graph and its rendering
//! - [`ai`]: LLM client, retry policy, prompts
//! - [`docs`]: worker pool and project-level synthesis
//! - [`output`]: files on disk, run manifest, Docusaurus site
//! - [`pipeline`]: the end-to-end run

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod graph;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::{DocError, ErrorCategory, FileRecord, LlmError, Manifest, Result};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use docs::{Orchestrator, ProjectSummary};
pub use index::{DocIndex, DocSet};
pub use pipeline::{Analysis, DocPipeline, PipelineOutcome};

// =============================================================================
// Component Re-exports
// =============================================================================

pub use ai::{CompletionRequest, LlmClient, SharedClient, create_client};
pub use analyzer::{Language, scanner::FileScanner};
pub use graph::{DependencyEdge, DependencyGraph, DependencyTarget};
pub use output::{OutputAssembler, SiteGenerator};

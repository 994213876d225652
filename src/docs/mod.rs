//! Documentation generation: per-file tasks, the worker pool that runs
//! them, and project-level synthesis.

pub mod context;
pub mod orchestrator;
pub mod summary;
pub mod synthesis;
pub mod task;

pub use context::project_context;
pub use orchestrator::Orchestrator;
pub use summary::{DocumentationArtifact, ProjectSummary, TaskFailure};
pub use task::{AnalysisTask, TaskStatus};

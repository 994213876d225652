//! Aggregated result of one documentation run.

use super::task::AnalysisTask;
use crate::graph::DependencyGraph;
use crate::types::{LlmError, Manifest};

/// Generated companion doc for one succeeded task
#[derive(Debug, Clone)]
pub struct DocumentationArtifact {
    pub task: AnalysisTask,
    pub generated_text: String,
    /// Relative to the output root
    pub output_path: String,
}

impl DocumentationArtifact {
    pub fn path(&self) -> &str {
        self.task.path()
    }
}

/// A file whose documentation could not be produced
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub task: AnalysisTask,
    pub error: LlmError,
}

impl TaskFailure {
    pub fn path(&self) -> &str {
        self.task.path()
    }
}

/// Everything the assembler needs. Built once, after every task is terminal.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub project_name: String,
    pub manifest: Manifest,
    /// Succeeded tasks in manifest order
    pub artifacts: Vec<DocumentationArtifact>,
    /// Failed tasks in manifest order
    pub failures: Vec<TaskFailure>,
    pub graph: DependencyGraph,
    /// Overview body including the coverage section
    pub overview_text: String,
    /// False when the deterministic fallback overview was used
    pub overview_from_llm: bool,
    /// Full dependency document
    pub dependency_text: String,
}

impl ProjectSummary {
    pub fn total(&self) -> usize {
        self.manifest.len()
    }

    pub fn succeeded(&self) -> usize {
        self.artifacts.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn artifact(&self, path: &str) -> Option<&DocumentationArtifact> {
        self.artifacts.iter().find(|a| a.path() == path)
    }

    pub fn failure(&self, path: &str) -> Option<&TaskFailure> {
        self.failures.iter().find(|f| f.path() == path)
    }

    /// Every manifest file ended in exactly one terminal state
    pub fn is_complete(&self) -> bool {
        self.succeeded() + self.failed() == self.total()
    }
}

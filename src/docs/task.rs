//! Per-file analysis task and its state machine.
//!
//! `Pending → InFlight → Succeeded | Failed`, each transition at most once.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::{DependencyEdge, DependencyGraph};
use crate::types::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documentation request per manifest file
#[derive(Debug, Clone)]
pub struct AnalysisTask {
    /// Position in the manifest; used to restore manifest order
    pub index: usize,
    pub file: Arc<FileRecord>,
    pub dependencies: Vec<DependencyEdge>,
    /// LLM attempts spent on this task, retries included
    pub attempt_count: u32,
    status: TaskStatus,
}

impl AnalysisTask {
    pub fn new(index: usize, file: Arc<FileRecord>, graph: &DependencyGraph) -> Self {
        let dependencies = graph.dependencies(&file.relative_path).to_vec();
        Self {
            index,
            file,
            dependencies,
            attempt_count: 0,
            status: TaskStatus::Pending,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn path(&self) -> &str {
        &self.file.relative_path
    }

    /// Pending → InFlight
    pub fn dispatch(&mut self) {
        debug_assert_eq!(self.status, TaskStatus::Pending, "task dispatched twice");
        self.status = TaskStatus::InFlight;
    }

    /// InFlight → Succeeded
    pub fn succeed(&mut self, attempts: u32) {
        self.finish(TaskStatus::Succeeded, attempts);
    }

    /// InFlight → Failed; also used for tasks that never reached a worker
    pub fn fail(&mut self, attempts: u32) {
        self.finish(TaskStatus::Failed, attempts);
    }

    fn finish(&mut self, status: TaskStatus, attempts: u32) {
        debug_assert!(!self.status.is_terminal(), "task finished twice");
        self.attempt_count += attempts;
        self.status = status;
    }
}

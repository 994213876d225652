//! Documentation Orchestrator
//!
//! A fixed number of workers pull tasks from one shared queue and issue one
//! LLM call per task. The queue and the result list are each behind a mutex
//! held only for a pop or a push, never across a call. Completion order is
//! arbitrary; results are put back into manifest order once every task is
//! terminal, and only then are the overview and dependency document built.
//!
//! A failed task never affects its siblings. An authentication failure is
//! the exception: it raises a shared abort flag, workers stop taking tasks
//! and the run returns [`DocError::Aborted`].

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use super::summary::{DocumentationArtifact, ProjectSummary, TaskFailure};
use super::synthesis;
use super::task::AnalysisTask;
use crate::ai::{CompletionRequest, RetryPolicy, SharedClient, complete_with_retry};
use crate::config::{Config, GenerationConfig};
use crate::graph::DependencyGraph;
use crate::types::{DocError, LlmError, Manifest, Result};

enum TaskResult {
    Done(DocumentationArtifact),
    Failed(TaskFailure),
}

impl TaskResult {
    fn index(&self) -> usize {
        match self {
            Self::Done(a) => a.task.index,
            Self::Failed(f) => f.task.index,
        }
    }
}

/// Immutable state shared by all workers
struct WorkerContext {
    client: SharedClient,
    policy: RetryPolicy,
    model: String,
    max_tokens: u32,
    project_context: String,
    max_file_chars: usize,
    dispatch_delay: Duration,
    queue: Mutex<VecDeque<AnalysisTask>>,
    results: Mutex<Vec<TaskResult>>,
    abort: AtomicBool,
    fatal: Mutex<Option<LlmError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Orchestrator {
    client: SharedClient,
    generation: GenerationConfig,
    policy: RetryPolicy,
    model: String,
    max_tokens: u32,
    project_name: Option<String>,
    project_context: String,
}

impl Orchestrator {
    pub fn new(client: SharedClient, config: &Config) -> Self {
        Self {
            client,
            generation: config.generation.clone(),
            policy: RetryPolicy::from_config(&config.llm),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            project_name: config.output.project_name.clone(),
            project_context: String::new(),
        }
    }

    /// Pool width; clamped to at least one worker
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.generation.workers = workers.max(1);
        self
    }

    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.generation.dispatch_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_project_context(mut self, context: impl Into<String>) -> Self {
        self.project_context = context.into();
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn workers(&self) -> usize {
        self.generation.workers.max(1)
    }

    /// Document every manifest file, then synthesize the project documents.
    #[instrument(skip_all, fields(files = manifest.len(), workers = self.workers()))]
    pub async fn run(&self, manifest: &Manifest, graph: &DependencyGraph) -> Result<ProjectSummary> {
        let project_name = self
            .project_name
            .clone()
            .unwrap_or_else(|| manifest.project_name());

        let tasks: VecDeque<AnalysisTask> = manifest
            .iter()
            .enumerate()
            .map(|(index, file)| AnalysisTask::new(index, Arc::clone(file), graph))
            .collect();

        info!(tasks = tasks.len(), "Dispatching documentation tasks");

        let ctx = Arc::new(WorkerContext {
            client: Arc::clone(&self.client),
            policy: self.policy.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            project_context: self.project_context.clone(),
            max_file_chars: self.generation.max_file_chars,
            dispatch_delay: self.generation.dispatch_delay(),
            queue: Mutex::new(tasks),
            results: Mutex::new(Vec::with_capacity(manifest.len())),
            abort: AtomicBool::new(false),
            fatal: Mutex::new(None),
        });

        let width = self.workers().min(manifest.len());
        let mut workers = JoinSet::new();
        for id in 0..width {
            workers.spawn(worker(id, Arc::clone(&ctx)));
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker terminated unexpectedly");
            }
        }

        if let Some(err) = lock(&ctx.fatal).take() {
            error!(error = %err, "Authentication failed, aborting run");
            return Err(DocError::aborted(format!("authentication failed: {}", err)));
        }

        let mut results = std::mem::take(&mut *lock(&ctx.results));
        recover_lost_tasks(&mut results, manifest, graph);
        results.sort_by_key(TaskResult::index);

        let mut artifacts = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                TaskResult::Done(artifact) => artifacts.push(artifact),
                TaskResult::Failed(failure) => failures.push(failure),
            }
        }

        info!(
            total = manifest.len(),
            succeeded = artifacts.len(),
            failed = failures.len(),
            "All documentation tasks finished"
        );

        self.synthesize(project_name, manifest, graph, artifacts, failures)
            .await
    }

    async fn synthesize(
        &self,
        project_name: String,
        manifest: &Manifest,
        graph: &DependencyGraph,
        artifacts: Vec<DocumentationArtifact>,
        failures: Vec<TaskFailure>,
    ) -> Result<ProjectSummary> {
        let prompt = synthesis::overview_prompt(
            &project_name,
            manifest,
            &artifacts,
            &failures,
            graph,
            self.generation.overview_budget_chars,
            self.generation.excerpt_chars,
        );

        let (overview, overview_from_llm) = match self.call("project overview", prompt).await? {
            Some(text) => (text, true),
            None => (synthesis::fallback_overview(&project_name, &artifacts), false),
        };
        let overview_text = format!(
            "{}\n\n{}",
            overview.trim_end(),
            synthesis::coverage_section(manifest.len(), &artifacts, &failures)
        );

        let narrative = if self.generation.dependency_narrative && graph.edge_count() > 0 {
            let prompt = synthesis::narrative_prompt(
                &project_name,
                graph,
                manifest,
                self.generation.overview_budget_chars,
            );
            self.call("dependency narrative", prompt).await?
        } else {
            None
        };
        let documented: HashSet<&str> = artifacts.iter().map(|a| a.path()).collect();
        let has_doc = |path: &str| documented.contains(path);
        let dependency_text =
            synthesis::dependency_document(graph, manifest, narrative.as_deref(), &has_doc);

        Ok(ProjectSummary {
            project_name,
            manifest: manifest.clone(),
            artifacts,
            failures,
            graph: graph.clone(),
            overview_text,
            overview_from_llm,
            dependency_text,
        })
    }

    /// Synthesis call: `None` on a non-fatal failure, `Err` on auth failure
    async fn call(&self, what: &str, prompt: String) -> Result<Option<String>> {
        let request = CompletionRequest::new(prompt, self.model.clone(), self.max_tokens);
        let outcome = complete_with_retry(self.client.as_ref(), &request, &self.policy).await;
        match outcome.result {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.is_fatal() => {
                error!(error = %err, "Authentication failed during {}", what);
                Err(DocError::aborted(format!("authentication failed: {}", err)))
            }
            Err(err) => {
                warn!(error = %err, attempts = outcome.attempts, "Failed to generate {}", what);
                Ok(None)
            }
        }
    }
}

async fn worker(id: usize, ctx: Arc<WorkerContext>) {
    let mut first = true;

    loop {
        if ctx.abort.load(Ordering::SeqCst) {
            debug!(worker = id, "Abort flag set, stopping");
            break;
        }
        let Some(mut task) = lock(&ctx.queue).pop_front() else {
            break;
        };

        // throttle between this worker's own dispatches only
        if !first && !ctx.dispatch_delay.is_zero() {
            sleep(ctx.dispatch_delay).await;
            if ctx.abort.load(Ordering::SeqCst) {
                debug!(worker = id, "Abort flag set, stopping");
                break;
            }
        }
        first = false;

        task.dispatch();
        debug!(worker = id, path = %task.path(), "Documenting file");

        let prompt = synthesis::file_prompt(&task, &ctx.project_context, ctx.max_file_chars);
        let request = CompletionRequest::new(prompt, ctx.model.clone(), ctx.max_tokens);
        let outcome = complete_with_retry(ctx.client.as_ref(), &request, &ctx.policy).await;

        let result = match outcome.result {
            Ok(text) => {
                task.succeed(outcome.attempts);
                debug!(worker = id, path = %task.path(), attempts = outcome.attempts, "File documented");
                TaskResult::Done(DocumentationArtifact {
                    output_path: synthesis::output_path(&task),
                    generated_text: text,
                    task,
                })
            }
            Err(err) => {
                task.fail(outcome.attempts);
                if err.is_fatal() {
                    ctx.abort.store(true, Ordering::SeqCst);
                    lock(&ctx.fatal).get_or_insert_with(|| err.clone());
                }
                warn!(worker = id, path = %task.path(), error = %err, "Documentation task failed");
                TaskResult::Failed(TaskFailure { task, error: err })
            }
        };

        lock(&ctx.results).push(result);
    }
}

/// Tasks held by a worker that panicked are reported as failed so every
/// manifest file still ends in a terminal state.
fn recover_lost_tasks(results: &mut Vec<TaskResult>, manifest: &Manifest, graph: &DependencyGraph) {
    let seen: BTreeSet<usize> = results.iter().map(TaskResult::index).collect();
    for (index, file) in manifest.iter().enumerate() {
        if seen.contains(&index) {
            continue;
        }
        let mut task = AnalysisTask::new(index, Arc::clone(file), graph);
        task.fail(0);
        results.push(TaskResult::Failed(TaskFailure {
            task,
            error: LlmError::server("worker terminated before finishing the task"),
        }));
    }
}

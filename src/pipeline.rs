//! Documentation Pipeline
//!
//! Preflight → scan → extract → graph → orchestrate → write → site.
//!
//! Preflight checks the repository, the output location and the credential
//! before any file is read or any call is made. Every `Err` returned from
//! [`DocPipeline::run`] is fatal; skipped files, degraded extraction and
//! failed tasks are reported in the [`PipelineOutcome`] instead.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::ai::{SharedClient, create_client};
use crate::analyzer::extractor::extract_all;
use crate::analyzer::scanner::{FileScanner, ScanReport};
use crate::config::Config;
use crate::docs::{Orchestrator, ProjectSummary, project_context};
use crate::graph::DependencyGraph;
use crate::output::{AssemblyReport, OutputAssembler, SiteGenerator, SiteReport, default_site_dir};
use crate::types::{DocError, ExtractionWarning, Result, ScanWarning};

const WRITE_PROBE: &str = ".repodoc-write-probe";

/// Scan, extraction and graph of one repository; no LLM involved
#[derive(Debug)]
pub struct Analysis {
    pub scan: ScanReport,
    pub extraction_warnings: Vec<ExtractionWarning>,
    pub graph: DependencyGraph,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub summary: ProjectSummary,
    pub assembly: AssemblyReport,
    pub site: Option<SiteReport>,
    pub scan_warnings: Vec<ScanWarning>,
    pub unsupported: usize,
    pub extraction_warnings: Vec<ExtractionWarning>,
}

pub struct DocPipeline {
    repo: PathBuf,
    config: Config,
    client: Option<SharedClient>,
}

impl DocPipeline {
    pub fn new(repo: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            repo: repo.into(),
            config,
            client: None,
        }
    }

    /// Use `client` instead of building one from the LLM config
    pub fn with_client(mut self, client: SharedClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Canonical repository root
    pub fn repo_root(&self) -> Result<PathBuf> {
        if !self.repo.is_dir() {
            return Err(DocError::RepositoryNotFound(self.repo.clone()));
        }
        Ok(fs::canonicalize(&self.repo)?)
    }

    /// Name shown in documents: configured, else the root directory name
    pub fn project_name(&self, root: &Path) -> String {
        self.config.output.project_name.clone().unwrap_or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string()
        })
    }

    /// Configured output root, else a fresh sibling `<project>-docs-<8 hex>`
    pub fn output_root(&self, root: &Path) -> PathBuf {
        match &self.config.output.dir {
            Some(dir) => dir.clone(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                let name = format!("{}-docs-{}", self.project_name(root), &id[..8]);
                root.parent().unwrap_or(root).join(name)
            }
        }
    }

    /// Scan, extract and build the graph without contacting the LLM.
    #[instrument(skip(self), fields(repo = %self.repo.display()))]
    pub fn analyze(&self) -> Result<Analysis> {
        let root = self.repo_root()?;
        analyze_root(&root, &self.config)
    }

    /// Full run.
    #[instrument(skip(self), fields(repo = %self.repo.display()))]
    pub async fn run(&self) -> Result<PipelineOutcome> {
        self.config.validate()?;
        let root = self.repo_root()?;
        let output_root = self.output_root(&root);
        let created = prepare_output(&output_root)?;
        let client = match &self.client {
            Some(client) => client.clone(),
            None => match create_client(&self.config.llm) {
                Ok(client) => client,
                Err(e) => {
                    discard_empty(&output_root, created);
                    return Err(e);
                }
            },
        };

        info!(
            provider = client.name(),
            model = %self.config.llm.model,
            output = %output_root.display(),
            "Preflight passed"
        );

        let result = self.generate(&root, &output_root, client).await;
        if result.is_err() {
            discard_empty(&output_root, created);
        }
        result
    }

    async fn generate(
        &self,
        root: &Path,
        output_root: &Path,
        client: SharedClient,
    ) -> Result<PipelineOutcome> {
        info!("Scanning repository");
        let analysis = analyze_root(root, &self.config)?;
        let Analysis {
            scan,
            extraction_warnings,
            graph,
        } = analysis;
        let manifest = scan.manifest;

        info!(files = manifest.len(), "Documenting files");
        let orchestrator = Orchestrator::new(client, &self.config)
            .with_project_name(self.project_name(root))
            .with_project_context(project_context(root));
        let summary = orchestrator.run(&manifest, &graph).await?;

        info!("Writing documentation");
        let assembly = OutputAssembler::new(output_root).write(&summary)?;

        let site = if self.config.site.enabled {
            let site_root = self
                .config
                .site
                .dir
                .clone()
                .unwrap_or_else(|| default_site_dir(output_root));
            info!(site = %site_root.display(), "Generating Docusaurus site");
            Some(
                SiteGenerator::new(site_root, summary.project_name.clone())
                    .with_show_hidden(self.config.site.show_hidden)
                    .generate(&assembly.documents)?,
            )
        } else {
            None
        };

        info!(
            total = summary.total(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Run complete"
        );

        Ok(PipelineOutcome {
            summary,
            assembly,
            site,
            scan_warnings: scan.warnings,
            unsupported: scan.unsupported,
            extraction_warnings,
        })
    }
}

fn analyze_root(root: &Path, config: &Config) -> Result<Analysis> {
    let scan = FileScanner::from_config(root, &config.scan).scan()?;
    for warning in &scan.warnings {
        warn!(%warning, "Skipped");
    }

    let extraction = extract_all(&scan.manifest);
    for warning in &extraction.warnings {
        warn!(%warning, "Dependency extraction");
    }

    let graph = DependencyGraph::build(&scan.manifest, &extraction.edge_lists);
    info!(
        files = scan.manifest.len(),
        skipped = scan.warnings.len(),
        edges = graph.edge_count(),
        "Repository analyzed"
    );

    Ok(Analysis {
        scan,
        extraction_warnings: extraction.warnings,
        graph,
    })
}

/// Create the output root and prove it writable. Returns whether it was
/// created by this call.
fn prepare_output(output_root: &Path) -> Result<bool> {
    let existed = output_root.is_dir();
    fs::create_dir_all(output_root).map_err(|e| DocError::output_not_writable(output_root, e))?;

    let probe = output_root.join(WRITE_PROBE);
    fs::write(&probe, b"").map_err(|e| DocError::output_not_writable(output_root, e))?;
    fs::remove_file(&probe).map_err(|e| DocError::output_not_writable(output_root, e))?;
    Ok(!existed)
}

/// Remove an output root this run created, if nothing was written to it
fn discard_empty(output_root: &Path, created: bool) {
    if created {
        let _ = fs::remove_dir(output_root);
    }
}

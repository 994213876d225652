//! Generate Command
//!
//! Usage:
//!   repodoc generate [REPO] [-o DIR] [--model M] [--workers N] [--site]

use std::path::PathBuf;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::{DocPipeline, PipelineOutcome};
use crate::types::Result;

/// Command-line overrides, applied on top of the loaded config
#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub repo: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub project_name: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub workers: Option<usize>,
    pub site: bool,
    pub site_dir: Option<PathBuf>,
    pub show_hidden: bool,
    pub no_narrative: bool,
    pub quiet: bool,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let out = Output::quiet(options.quiet);
    let mut config = load_config(&options.repo, options.config.as_deref())?;

    if let Some(dir) = options.output {
        config.output.dir = Some(dir);
    }
    if let Some(name) = options.project_name {
        config.output.project_name = Some(name);
    }
    if let Some(provider) = options.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = options.model {
        config.llm.model = model;
    }
    if let Some(key) = options.api_key {
        config.llm.api_key = Some(key);
    }
    if let Some(workers) = options.workers {
        config.generation.workers = workers;
    }
    if options.site {
        config.site.enabled = true;
    }
    if let Some(dir) = options.site_dir {
        config.site.dir = Some(dir);
    }
    if options.show_hidden {
        config.site.show_hidden = true;
    }
    if options.no_narrative {
        config.generation.dependency_narrative = false;
    }

    out.header("repodoc");
    out.field("Repository", options.repo.display());
    out.field("Model", &config.llm.model);
    out.field("Workers", config.generation.workers);

    let outcome = match DocPipeline::new(&options.repo, config).run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.is_auth_failure() {
                out.info("Set an API key with --api-key, REPODOC_API_KEY or llm.api_key");
            }
            return Err(e);
        }
    };
    report(&out, &outcome);
    Ok(())
}

fn report(out: &Output, outcome: &PipelineOutcome) {
    let summary = &outcome.summary;

    out.section("Files");
    out.field("Documented", summary.succeeded());
    out.field("Failed", summary.failed());
    out.field("Skipped", outcome.scan_warnings.len());
    out.field("Unsupported", outcome.unsupported);
    if !summary.overview_from_llm {
        out.warning("Overview generation failed; a file index was written instead");
    }

    for failure in &summary.failures {
        out.warning(&format!(
            "{} ({} attempts): {}",
            failure.path(),
            failure.task.attempt_count,
            failure.error
        ));
    }
    for warning in &outcome.scan_warnings {
        out.warning(&format!("skipped {}", warning));
    }
    for warning in &outcome.extraction_warnings {
        out.warning(&format!("dependencies {}", warning));
    }

    out.section("Output");
    out.field("Docs", outcome.assembly.output_root.display());
    out.field("Manifest", outcome.assembly.manifest_path.display());
    if let Some(site) = &outcome.site {
        out.field("Site", site.website.display());
        out.info("Run `npm install && npm start` in the site directory to preview");
    }

    if summary.succeeded() == 0 && summary.total() > 0 {
        out.error(&format!("No files were documented: 0 of {} succeeded", summary.total()));
    } else {
        out.success(&format!(
            "Documented {} of {} files",
            summary.succeeded(),
            summary.total()
        ));
    }
}

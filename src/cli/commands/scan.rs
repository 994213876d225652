//! Scan Command
//!
//! Dry run: shows what `generate` would document, without a credential and
//! without calling the LLM.

use std::path::{Path, PathBuf};

use serde_json::json;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::{Analysis, DocPipeline};
use crate::types::Result;

pub fn run(repo: &Path, config_path: Option<PathBuf>, format: &str) -> Result<()> {
    let config = load_config(repo, config_path.as_deref())?;
    let analysis = DocPipeline::new(repo, config).analyze()?;

    if format == "json" {
        Output::new().raw(&serde_json::to_string_pretty(&to_json(&analysis))?);
        return Ok(());
    }

    let out = Output::new();
    let manifest = &analysis.scan.manifest;
    out.header(&format!("{} ({} files)", manifest.project_name(), manifest.len()));

    for file in manifest.iter() {
        out.item(format!(
            "{} [{}, {} bytes]",
            file.relative_path, file.language, file.size_bytes
        ));
        for edge in analysis.graph.dependencies(&file.relative_path) {
            match &edge.resolved_target {
                Some(target) => out.raw(&format!("      → {}", target.relative_path)),
                None => out.raw(&format!("      → {} (external)", edge.target_identifier)),
            }
        }
    }

    out.section("Summary");
    out.field("Files", manifest.len());
    out.field("Dependencies", analysis.graph.edge_count());
    out.field("Internal", analysis.graph.internal_edge_count());
    out.field("Skipped", analysis.scan.warnings.len());
    out.field("Unsupported", analysis.scan.unsupported);
    for warning in &analysis.scan.warnings {
        out.warning(&format!("skipped {}", warning));
    }
    for warning in &analysis.extraction_warnings {
        out.warning(&format!("dependencies {}", warning));
    }
    Ok(())
}

fn to_json(analysis: &Analysis) -> serde_json::Value {
    let files: Vec<serde_json::Value> = analysis
        .scan
        .manifest
        .iter()
        .map(|file| {
            let deps: Vec<serde_json::Value> = analysis
                .graph
                .dependencies(&file.relative_path)
                .iter()
                .map(|edge| json!({ "identifier": edge.target_identifier, "target": edge.target() }))
                .collect();
            json!({
                "path": file.relative_path,
                "language": file.language.as_str(),
                "size_bytes": file.size_bytes,
                "dependencies": deps,
            })
        })
        .collect();

    json!({
        "root": analysis.scan.manifest.root(),
        "files": files,
        "skipped": analysis.scan.warnings,
        "unsupported": analysis.scan.unsupported,
        "extraction_warnings": analysis.extraction_warnings,
    })
}

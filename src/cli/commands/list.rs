//! List Command
//!
//! Shows documentation sets found under the given directories.

use std::path::PathBuf;

use serde_json::json;

use crate::cli::Output;
use crate::index::{DocIndex, DocSet};
use crate::types::Result;

pub fn run(roots: Vec<PathBuf>, project: Option<&str>, format: &str) -> Result<()> {
    let roots = if roots.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        roots
    };
    let index = DocIndex::new(roots);
    let sets: Vec<&DocSet> = match project {
        Some(name) => index.find(name).collect(),
        None => index.projects().iter().collect(),
    };

    let out = Output::new();
    if format == "json" {
        let items: Vec<serde_json::Value> = sets
            .iter()
            .map(|set| {
                json!({
                    "root": set.root,
                    "project": set.project_name(),
                    "generated_at": set.manifest.generated_at,
                    "total": set.manifest.total,
                    "succeeded": set.manifest.succeeded,
                    "failed": set.manifest.failed,
                })
            })
            .collect();
        out.raw(&serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if sets.is_empty() {
        out.info("No generated documentation found");
        return Ok(());
    }

    out.header("Documentation sets");
    for set in sets {
        out.item(format!(
            "{}  {}  {}/{} documented  {}",
            set.project_name(),
            set.manifest.generated_at.format("%Y-%m-%d %H:%M UTC"),
            set.manifest.succeeded,
            set.manifest.total,
            set.root.join(&set.manifest.overview).display()
        ));
    }
    Ok(())
}

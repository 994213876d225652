//! Output Assembler
//!
//! Writes a [`ProjectSummary`] to disk: one companion doc per documented
//! file mirroring the source tree, the overview, the dependency document and
//! the run manifest. Existing files at the same paths are overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use super::links::{doc_path, markdown_link};
use super::manifest::RunManifest;
use super::tree::{DocTree, QuickLinks};
use crate::constants::output::{DEPENDENCY_FILE, OVERVIEW_FILE};
use crate::docs::{DocumentationArtifact, ProjectSummary};
use crate::graph::DependencyTarget;
use crate::types::{DocError, Result};

/// A markdown document as written, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDoc {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct AssemblyReport {
    pub output_root: PathBuf,
    /// Companion docs first (manifest order), then the overview and the
    /// dependency document
    pub documents: Vec<WrittenDoc>,
    pub manifest_path: PathBuf,
}

impl AssemblyReport {
    pub fn companion_count(&self) -> usize {
        self.documents.len().saturating_sub(2)
    }
}

pub struct OutputAssembler {
    root: PathBuf,
}

impl OutputAssembler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, summary: &ProjectSummary) -> Result<AssemblyReport> {
        fs::create_dir_all(&self.root)
            .map_err(|e| DocError::output_not_writable(&self.root, e))?;

        let mut documents = Vec::with_capacity(summary.artifacts.len() + 2);
        for artifact in &summary.artifacts {
            let doc = WrittenDoc {
                path: artifact.output_path.clone(),
                content: companion_document(artifact, summary),
            };
            self.write_doc(&doc)?;
            documents.push(doc);
        }
        debug!(count = documents.len(), "Companion docs written");

        for doc in [
            WrittenDoc {
                path: OVERVIEW_FILE.to_string(),
                content: overview_document(summary),
            },
            WrittenDoc {
                path: DEPENDENCY_FILE.to_string(),
                content: summary.dependency_text.clone(),
            },
        ] {
            self.write_doc(&doc)?;
            documents.push(doc);
        }

        let manifest_path = RunManifest::from_summary(summary, Utc::now()).write(&self.root)?;

        info!(
            root = %self.root.display(),
            documents = documents.len(),
            "Documentation written"
        );

        Ok(AssemblyReport {
            output_root: self.root.clone(),
            documents,
            manifest_path,
        })
    }

    fn write_doc(&self, doc: &WrittenDoc) -> Result<()> {
        let path = self.root.join(&doc.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &doc.content)?;
        Ok(())
    }
}

/// Generated text plus a navigation footer
pub fn companion_document(artifact: &DocumentationArtifact, summary: &ProjectSummary) -> String {
    let from = artifact.output_path.as_str();
    let link_or_code = |path: &str| {
        if summary.artifact(path).is_some() {
            markdown_link(path, from, &doc_path(path))
        } else {
            format!("`{}`", path)
        }
    };

    let mut out = artifact.generated_text.trim_end().to_string();
    out.push_str("\n\n---\n\n");

    let deps: Vec<String> = artifact
        .task
        .dependencies
        .iter()
        .map(|edge| match edge.target() {
            DependencyTarget::Internal(path) => link_or_code(&path),
            DependencyTarget::External(name) => format!("`{}` *(external)*", name),
        })
        .collect();
    if !deps.is_empty() {
        out.push_str(&format!("**Depends on**: {}\n\n", deps.join(", ")));
    }

    if let Some(dependents) = summary.graph.dependents_of_file(artifact.path()) {
        let users: Vec<String> = dependents.iter().map(|p| link_or_code(p)).collect();
        out.push_str(&format!("**Used by**: {}\n\n", users.join(", ")));
    }

    out.push_str(&format!(
        "{} | {}\n",
        markdown_link("Project overview", from, OVERVIEW_FILE),
        markdown_link("Dependency graph", from, DEPENDENCY_FILE)
    ));
    out
}

/// README.md: overview text followed by the navigation sections
pub fn overview_document(summary: &ProjectSummary) -> String {
    let documented: Vec<&str> = summary.artifacts.iter().map(|a| a.path()).collect();

    let mut out = summary.overview_text.trim_end().to_string();
    out.push_str("\n\n## Documentation structure\n\n");
    let tree = DocTree::new(documented.iter().copied());
    if tree.is_empty() {
        out.push_str("_No documented files._\n");
    } else {
        out.push_str(&tree.render(OVERVIEW_FILE));
    }

    out.push_str("\n## Dependency graph\n\n");
    out.push_str(&format!(
        "See {} for the forward and reverse dependency lists.\n",
        markdown_link(DEPENDENCY_FILE, OVERVIEW_FILE, DEPENDENCY_FILE)
    ));

    out.push_str("\n## Navigation\n\n");
    out.push_str(&QuickLinks::collect(documented.iter().copied()).render(OVERVIEW_FILE));

    out.push_str(&format!(
        "\n---\n\n_Generated by {} v{}_\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    out
}

//! Prompt construction and project-level synthesis.
//!
//! The overview prompt degrades in three steps to stay within its size
//! budget: full per-file docs, then short excerpts, then names only.

use crate::ai::{PromptTemplates, truncate_chars};
use crate::graph::DependencyGraph;
use crate::graph::render::{HasDoc, render_markdown};
use crate::output::links::{doc_path, markdown_link};
use crate::types::Manifest;

use super::summary::{DocumentationArtifact, TaskFailure};
use super::task::AnalysisTask;
use crate::constants::output::OVERVIEW_FILE;

/// Per-file documentation prompt
pub fn file_prompt(task: &AnalysisTask, project_context: &str, max_file_chars: usize) -> String {
    let file = &task.file;
    let (content, truncated) = truncate_chars(&file.content, max_file_chars);

    let deps = if task.dependencies.is_empty() {
        "No declared dependencies".to_string()
    } else {
        task.dependencies
            .iter()
            .map(|edge| match &edge.resolved_target {
                Some(target) => format!(
                    "- {} (internal: {})",
                    edge.target_identifier, target.relative_path
                ),
                None => format!("- {} (external)", edge.target_identifier),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut builder = PromptTemplates::file_documentation(&file.relative_path, file.language.as_str())
        .context_item("File", &file.relative_path)
        .context_item("Language", file.language.as_str());
    if !project_context.is_empty() {
        builder = builder.section("Project context", project_context);
    }
    builder = builder.section("File dependencies", &deps);
    if truncated {
        builder = builder.text(&format!(
            "Note: the file is longer than {} characters; only the beginning is shown.",
            max_file_chars
        ));
    }

    builder
        .source(file.language.highlight_str(), &content)
        .build()
}

/// `**file**: dep, dep` per manifest file
fn dependency_listing(graph: &DependencyGraph, manifest: &Manifest) -> String {
    manifest
        .iter()
        .map(|file| {
            let deps: Vec<String> = graph
                .dependencies(&file.relative_path)
                .iter()
                .map(|edge| edge.target().to_string())
                .collect();
            if deps.is_empty() {
                format!("**{}**: no dependencies", file.relative_path)
            } else {
                format!("**{}**: {}", file.relative_path, deps.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Project overview prompt within `budget_chars`
pub fn overview_prompt(
    project_name: &str,
    manifest: &Manifest,
    artifacts: &[DocumentationArtifact],
    failures: &[TaskFailure],
    graph: &DependencyGraph,
    budget_chars: usize,
    excerpt_chars: usize,
) -> String {
    let listing = dependency_listing(graph, manifest);
    let (listing, _) = truncate_chars(&listing, budget_chars / 4);

    let full: String = artifacts
        .iter()
        .map(|a| format!("## {}\n{}\n\n", a.path(), a.generated_text.trim()))
        .collect();

    let listing_chars = listing.chars().count();
    let docs = if full.chars().count() + listing_chars <= budget_chars {
        full
    } else {
        let excerpts: String = artifacts
            .iter()
            .map(|a| {
                let (excerpt, _) = truncate_chars(a.generated_text.trim(), excerpt_chars);
                format!(
                    "## {} ({})\n{}\n\n",
                    a.path(),
                    a.task.file.language,
                    excerpt
                )
            })
            .collect();
        if excerpts.chars().count() + listing_chars <= budget_chars {
            excerpts
        } else {
            artifacts
                .iter()
                .map(|a| format!("- {} ({})\n", a.path(), a.task.file.language))
                .collect()
        }
    };

    let mut builder = PromptTemplates::project_overview(project_name)
        .context_item("Project", project_name)
        .context_item("Files", &manifest.len().to_string())
        .context_item("Documented", &artifacts.len().to_string())
        .section("Documentation of individual files", docs.trim_end())
        .section("Dependency graph", &listing);

    if !failures.is_empty() {
        let names: Vec<String> = failures.iter().map(|f| format!("- {}", f.path())).collect();
        builder = builder.section(
            "Files without documentation (analysis failed)",
            &names.join("\n"),
        );
    }

    builder.build()
}

/// Deterministic overview used when the overview call fails
pub fn fallback_overview(project_name: &str, artifacts: &[DocumentationArtifact]) -> String {
    let mut out = format!("# {} - Project Documentation\n\n", project_name);
    out.push_str(
        "_The generated overview is unavailable; this index was assembled from the per-file documentation._\n\n",
    );
    out.push_str("## Documented files\n\n");
    if artifacts.is_empty() {
        out.push_str("_None._\n");
    }
    for artifact in artifacts {
        out.push_str(&format!(
            "- {} ({})\n",
            markdown_link(artifact.path(), OVERVIEW_FILE, &artifact.output_path),
            artifact.task.file.language
        ));
    }
    out
}

/// Totals plus every file left undocumented
pub fn coverage_section(
    total: usize,
    artifacts: &[DocumentationArtifact],
    failures: &[TaskFailure],
) -> String {
    let mut out = String::from("## Documentation coverage\n\n");
    out.push_str(&format!(
        "- Files analyzed: {}\n- Documented: {}\n- Undocumented: {}\n\n",
        total,
        artifacts.len(),
        failures.len()
    ));

    if artifacts.is_empty() {
        out.push_str(&format!(
            "**No files were documented: 0 of {} succeeded.**\n\n",
            total
        ));
    }

    if !failures.is_empty() {
        out.push_str("### Undocumented due to analysis failure\n\n");
        for failure in failures {
            out.push_str(&format!(
                "- `{}`: {}\n",
                failure.path(),
                failure.error.category
            ));
        }
        out.push('\n');
    }

    out
}

/// Prompt for the optional architecture narrative
pub fn narrative_prompt(
    project_name: &str,
    graph: &DependencyGraph,
    manifest: &Manifest,
    budget_chars: usize,
) -> String {
    let (listing, _) = truncate_chars(&dependency_listing(graph, manifest), budget_chars);
    PromptTemplates::dependency_narrative(project_name)
        .context_item("Files", &manifest.len().to_string())
        .context_item("Internal edges", &graph.internal_edge_count().to_string())
        .context_item(
            "External packages",
            &graph.external_targets().count().to_string(),
        )
        .section("Dependencies by file", &listing)
        .build()
}

/// Rendered graph, with the narrative under the title when present
pub fn dependency_document(
    graph: &DependencyGraph,
    manifest: &Manifest,
    narrative: Option<&str>,
    has_doc: HasDoc<'_>,
) -> String {
    let rendered = render_markdown(graph, manifest, has_doc);
    match narrative.map(str::trim).filter(|n| !n.is_empty()) {
        Some(text) => rendered.replacen(
            "# Dependency Graph\n\n",
            &format!("# Dependency Graph\n\n## Architecture notes\n\n{}\n\n", text),
            1,
        ),
        None => rendered,
    }
}

/// Companion doc path for a succeeded task
pub fn output_path(task: &AnalysisTask) -> String {
    doc_path(task.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::extractor::extract_all;
    use crate::types::LlmError;
    use crate::types::record::record;
    use std::sync::Arc;

    fn fixture() -> (Manifest, DependencyGraph) {
        let manifest = Manifest::new(
            "/repo",
            vec![
                record("a.py", "import b\nimport os\n"),
                record("b.py", "x = 1\n"),
                record("c.py", "import os\n"),
            ],
        );
        let graph = DependencyGraph::build(&manifest, &extract_all(&manifest).edge_lists);
        (manifest, graph)
    }

    fn artifact(manifest: &Manifest, graph: &DependencyGraph, i: usize, text: &str) -> DocumentationArtifact {
        let task = AnalysisTask::new(i, Arc::clone(&manifest.files()[i]), graph);
        DocumentationArtifact {
            output_path: output_path(&task),
            generated_text: text.to_string(),
            task,
        }
    }

    fn failure(manifest: &Manifest, graph: &DependencyGraph, i: usize) -> TaskFailure {
        TaskFailure {
            task: AnalysisTask::new(i, Arc::clone(&manifest.files()[i]), graph),
            error: LlmError::malformed("empty completion"),
        }
    }

    #[test]
    fn test_file_prompt_contents() {
        let (manifest, graph) = fixture();
        let task = AnalysisTask::new(0, Arc::clone(&manifest.files()[0]), &graph);
        let prompt = file_prompt(&task, "README.md:\n# Demo", 10_000);

        assert!(prompt.contains("**File**: a.py"));
        assert!(prompt.contains("**Language**: Python"));
        assert!(prompt.contains("- b (internal: b.py)"));
        assert!(prompt.contains("- os (external)"));
        assert!(prompt.contains("# Project context\n\nREADME.md:\n# Demo"));
        assert!(prompt.contains("```python\nimport b\nimport os\n"));
    }

    #[test]
    fn test_file_prompt_truncates() {
        let manifest = Manifest::new("/repo", vec![record("big.py", &"y = 2\n".repeat(100))]);
        let graph = DependencyGraph::build(&manifest, &Default::default());
        let task = AnalysisTask::new(0, Arc::clone(&manifest.files()[0]), &graph);
        let prompt = file_prompt(&task, "", 30);

        assert!(prompt.contains("only the beginning is shown"));
        assert!(prompt.contains("[truncated 570 characters]"));
        assert!(!prompt.contains("Project context"));
    }

    #[test]
    fn test_overview_prompt_full_then_compact() {
        let (manifest, graph) = fixture();
        let long = "word ".repeat(400);
        let artifacts = vec![
            artifact(&manifest, &graph, 0, &long),
            artifact(&manifest, &graph, 1, &long),
        ];
        let failures = vec![failure(&manifest, &graph, 2)];

        let full = overview_prompt("demo", &manifest, &artifacts, &failures, &graph, 100_000, 50);
        assert!(full.contains(long.trim()));
        assert!(full.contains("**a.py**: b.py, os"));
        assert!(full.contains("- c.py"));

        let compact = overview_prompt("demo", &manifest, &artifacts, &failures, &graph, 1_000, 50);
        assert!(!compact.contains(long.trim()));
        assert!(compact.contains("## a.py (Python)\nword word"));

        let names = overview_prompt("demo", &manifest, &artifacts, &failures, &graph, 200, 50);
        assert!(names.contains("- a.py (Python)"));
        assert!(!names.contains("word word"));
    }

    #[test]
    fn test_overview_budget_counts_chars() {
        let (manifest, graph) = fixture();
        // 300 chars, 600 bytes each
        let accented = "é".repeat(300);
        let artifacts = vec![
            artifact(&manifest, &graph, 0, &accented),
            artifact(&manifest, &graph, 1, &accented),
        ];

        let prompt = overview_prompt("demo", &manifest, &artifacts, &[], &graph, 1_000, 50);
        assert!(prompt.contains(&format!("## a.py\n{}", accented)));
        assert!(!prompt.contains("## a.py (Python)"));
    }

    #[test]
    fn test_coverage_reports_zero_successes() {
        let (manifest, graph) = fixture();
        let failures: Vec<_> = (0..3).map(|i| failure(&manifest, &graph, i)).collect();
        let section = coverage_section(3, &[], &failures);

        assert!(section.contains("- Documented: 0"));
        assert!(section.contains("0 of 3 succeeded"));
        assert!(section.contains("### Undocumented due to analysis failure"));
        assert!(section.contains("- `c.py`: MALFORMED_RESPONSE"));
    }

    #[test]
    fn test_fallback_overview_links_docs() {
        let (manifest, graph) = fixture();
        let artifacts = vec![artifact(&manifest, &graph, 0, "doc")];
        let overview = fallback_overview("demo", &artifacts);

        assert!(overview.starts_with("# demo - Project Documentation"));
        assert!(overview.contains("- [a.py](a.py.md) (Python)"));
    }

    #[test]
    fn test_dependency_document_narrative() {
        let (manifest, graph) = fixture();
        let all = |_: &str| true;
        let plain = dependency_document(&graph, &manifest, None, &all);
        assert!(!plain.contains("Architecture notes"));

        let with = dependency_document(&graph, &manifest, Some("  b.py is central.  "), &all);
        assert!(with.starts_with("# Dependency Graph\n\n## Architecture notes\n\nb.py is central.\n\n"));

        assert_eq!(dependency_document(&graph, &manifest, Some("   "), &all), plain);
    }
}

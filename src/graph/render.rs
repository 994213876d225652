//! Markdown rendering of a [`DependencyGraph`].
//!
//! Output is deterministic: files in manifest order, targets sorted with
//! internal ones first. Internal targets link to their companion docs when
//! one exists, external ones are code spans marked *external*.

use std::collections::HashMap;

use super::{DependencyGraph, DependencyTarget};
use crate::constants::output::{DEPENDENCY_FILE, MAX_MERMAID_EDGES};
use crate::output::links::{doc_path, markdown_link};
use crate::types::Manifest;

/// Whether a manifest path has a companion doc to link to
pub type HasDoc<'a> = &'a dyn Fn(&str) -> bool;

/// Link to the companion doc of `path`, or a code span when there is none
fn file_ref(path: &str, has_doc: HasDoc<'_>) -> String {
    if has_doc(path) {
        markdown_link(path, DEPENDENCY_FILE, &doc_path(path))
    } else {
        format!("`{}`", path)
    }
}

/// Full body of the dependency document (without any narrative section)
pub fn render_markdown(graph: &DependencyGraph, manifest: &Manifest, has_doc: HasDoc<'_>) -> String {
    let mut out = String::new();
    out.push_str("# Dependency Graph\n\n");

    let external_refs = graph.edge_count() - graph.internal_edge_count();
    out.push_str(&format!(
        "{} files, {} declared dependencies ({} internal, {} external).\n\n",
        manifest.len(),
        graph.edge_count(),
        graph.internal_edge_count(),
        external_refs
    ));

    out.push_str(&render_mermaid(graph, manifest));
    out.push_str(&render_forward(graph, manifest, has_doc));
    out.push_str(&render_reverse(graph, has_doc));
    out
}

/// `## Dependencies by file`: one section per manifest file
pub fn render_forward(graph: &DependencyGraph, manifest: &Manifest, has_doc: HasDoc<'_>) -> String {
    let mut out = String::from("## Dependencies by file\n\n");

    for file in manifest.iter() {
        let path = &file.relative_path;
        out.push_str(&format!("### {}\n\n", file_ref(path, has_doc)));

        let edges = graph.dependencies(path);
        if edges.is_empty() {
            out.push_str("_No dependencies detected._\n\n");
            continue;
        }

        for edge in edges {
            match &edge.resolved_target {
                Some(target) => out.push_str(&format!(
                    "- {} (`{}`)\n",
                    file_ref(&target.relative_path, has_doc),
                    edge.target_identifier
                )),
                None => out.push_str(&format!("- `{}` *(external)*\n", edge.target_identifier)),
            }
        }
        out.push('\n');
    }

    out
}

/// `## Used by`: one section per dependency target
pub fn render_reverse(graph: &DependencyGraph, has_doc: HasDoc<'_>) -> String {
    let mut out = String::from("## Used by\n\n");

    if graph.reverse().next().is_none() {
        out.push_str("_No dependencies detected._\n\n");
        return out;
    }

    for (target, dependents) in graph.reverse() {
        match target {
            DependencyTarget::Internal(path) => {
                out.push_str(&format!("### {}\n\n", file_ref(path, has_doc)))
            }
            DependencyTarget::External(name) => {
                out.push_str(&format!("### `{}` *(external)*\n\n", name))
            }
        }
        for dependent in dependents {
            out.push_str(&format!("- {}\n", file_ref(dependent, has_doc)));
        }
        out.push('\n');
    }

    out
}

/// Mermaid flowchart of internal edges; omitted when there are none
pub fn render_mermaid(graph: &DependencyGraph, manifest: &Manifest) -> String {
    let internal: Vec<_> = graph.edges().filter(|e| e.is_resolved()).collect();
    if internal.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Diagram\n\n");
    if internal.len() > MAX_MERMAID_EDGES {
        out.push_str(&format!(
            "_Diagram omitted: {} internal edges exceed the limit of {}._\n\n",
            internal.len(),
            MAX_MERMAID_EDGES
        ));
        return out;
    }

    let ids: HashMap<&str, usize> = manifest
        .iter()
        .enumerate()
        .map(|(i, f)| (f.relative_path.as_str(), i))
        .collect();

    out.push_str("```mermaid\ngraph TD\n");
    for edge in internal {
        let Some(target) = &edge.resolved_target else {
            continue;
        };
        let (Some(from), Some(to)) = (
            ids.get(edge.source_path()),
            ids.get(target.relative_path.as_str()),
        ) else {
            continue;
        };
        out.push_str(&format!(
            "    n{}[\"{}\"] --> n{}[\"{}\"]\n",
            from,
            mermaid_label(edge.source_path()),
            to,
            mermaid_label(&target.relative_path)
        ));
    }
    out.push_str("```\n\n");
    out
}

fn mermaid_label(path: &str) -> String {
    path.replace('"', "#quot;")
}

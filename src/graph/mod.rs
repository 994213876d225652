//! Dependency Graph
//!
//! Forward view: file → declared dependencies, in declaration order.
//! Reverse view: dependency target → files that declare it.
//!
//! Both views are produced together by [`DependencyGraph::build`] and are
//! read-only afterwards, so every forward edge has a matching reverse entry.
//! Cycles are allowed; nothing downstream needs a topological order.

pub mod render;
pub mod resolver;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::types::{FileRecord, Manifest};
pub use resolver::Resolver;

/// Reverse-map key. Resolved targets are manifest paths, unresolved ones keep
/// the raw identifier; the enum keeps the two spaces apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DependencyTarget {
    Internal(String),
    External(String),
}

impl DependencyTarget {
    pub fn key(&self) -> &str {
        match self {
            Self::Internal(path) | Self::External(path) => path,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One declared dependency of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source: Arc<FileRecord>,
    /// Raw identifier as written in the source
    pub target_identifier: String,
    pub resolved_target: Option<Arc<FileRecord>>,
}

impl DependencyEdge {
    pub fn source_path(&self) -> &str {
        &self.source.relative_path
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_target.is_some()
    }

    pub fn target(&self) -> DependencyTarget {
        match &self.resolved_target {
            Some(file) => DependencyTarget::Internal(file.relative_path.clone()),
            None => DependencyTarget::External(self.target_identifier.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    forward: BTreeMap<String, Vec<DependencyEdge>>,
    reverse: BTreeMap<DependencyTarget, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Resolve every identifier and build both views in one pass.
    ///
    /// `edge_lists` is keyed by relative path; entries for paths outside the
    /// manifest are ignored. Every manifest file gets a forward entry.
    pub fn build(manifest: &Manifest, edge_lists: &BTreeMap<String, Vec<String>>) -> Self {
        let resolver = Resolver::new(manifest);
        let mut graph = Self::default();

        for source in manifest.iter() {
            let identifiers = edge_lists
                .get(&source.relative_path)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut seen = BTreeSet::new();
            let mut edges = Vec::with_capacity(identifiers.len());
            for identifier in identifiers {
                if !seen.insert(identifier.as_str()) {
                    continue;
                }
                let resolved_target = resolver.resolve(source, identifier);
                // `crate::X` from lib.rs and the like name the file itself
                if resolved_target
                    .as_ref()
                    .is_some_and(|t| t.relative_path == source.relative_path)
                {
                    continue;
                }
                let edge = DependencyEdge {
                    source: Arc::clone(source),
                    target_identifier: identifier.clone(),
                    resolved_target,
                };
                graph
                    .reverse
                    .entry(edge.target())
                    .or_default()
                    .insert(source.relative_path.clone());
                edges.push(edge);
            }

            graph.forward.insert(source.relative_path.clone(), edges);
        }

        debug!(
            files = graph.forward.len(),
            edges = graph.edge_count(),
            internal = graph.internal_edge_count(),
            "Dependency graph built"
        );
        graph
    }

    /// Declared dependencies of `path`, in declaration order
    pub fn dependencies(&self, path: &str) -> &[DependencyEdge] {
        self.forward.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Files declaring `target`
    pub fn dependents(&self, target: &DependencyTarget) -> Option<&BTreeSet<String>> {
        self.reverse.get(target)
    }

    /// Files whose dependencies resolved to `path`
    pub fn dependents_of_file(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.reverse.get(&DependencyTarget::Internal(path.to_string()))
    }

    pub fn forward(&self) -> impl Iterator<Item = (&str, &[DependencyEdge])> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Internal targets first, then external, each sorted by key
    pub fn reverse(&self) -> impl Iterator<Item = (&DependencyTarget, &BTreeSet<String>)> {
        self.reverse.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.forward.values().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    pub fn internal_edge_count(&self) -> usize {
        self.edges().filter(|e| e.is_resolved()).count()
    }

    pub fn external_targets(&self) -> impl Iterator<Item = &str> {
        self.reverse
            .keys()
            .filter(|t| !t.is_internal())
            .map(DependencyTarget::key)
    }
}

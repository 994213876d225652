//! Index of generated documentation sets.
//!
//! A doc set is any directory holding a run manifest. The index is built
//! explicitly over a list of search roots and only changes on `refresh()`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::output::RunManifest;

/// One generated documentation directory
#[derive(Debug, Clone)]
pub struct DocSet {
    pub root: PathBuf,
    pub manifest: RunManifest,
}

impl DocSet {
    pub fn project_name(&self) -> &str {
        &self.manifest.project_name
    }
}

#[derive(Debug, Default)]
pub struct DocIndex {
    roots: Vec<PathBuf>,
    sets: Vec<DocSet>,
}

impl DocIndex {
    /// Build the index over `roots`; each root and its direct children are
    /// checked for a run manifest
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut index = Self {
            roots: roots.into_iter().map(Into::into).collect(),
            sets: Vec::new(),
        };
        index.refresh();
        index
    }

    /// Rebuild from disk. Unreadable manifests are skipped with a warning.
    pub fn refresh(&mut self) {
        let mut sets = Vec::new();
        for root in &self.roots {
            if let Some(set) = load_set(root) {
                sets.push(set);
            }
            let Ok(entries) = fs::read_dir(root) else {
                debug!(root = %root.display(), "Search root not readable");
                continue;
            };
            let mut children: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            children.sort();
            sets.extend(children.iter().filter_map(|dir| load_set(dir)));
        }

        sets.sort_by(|a, b| {
            a.manifest
                .project_name
                .cmp(&b.manifest.project_name)
                .then_with(|| b.manifest.generated_at.cmp(&a.manifest.generated_at))
        });
        sets.dedup_by(|a, b| a.root == b.root);
        self.sets = sets;
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// All sets, by project name then newest first
    pub fn projects(&self) -> &[DocSet] {
        &self.sets
    }

    /// Sets generated for `project_name`, newest first
    pub fn find<'a>(&'a self, project_name: &'a str) -> impl Iterator<Item = &'a DocSet> + 'a {
        self.sets
            .iter()
            .filter(move |s| s.project_name() == project_name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn load_set(dir: &Path) -> Option<DocSet> {
    if !RunManifest::path_in(dir).is_file() {
        return None;
    }
    match RunManifest::load(dir) {
        Ok(manifest) => Some(DocSet {
            root: dir.to_path_buf(),
            manifest,
        }),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable run manifest");
            None
        }
    }
}

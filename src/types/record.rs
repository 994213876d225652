//! Scanned file records and the run manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::analyzer::Language;

/// One source file accepted by the scanner. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub language: Language,
    pub size_bytes: u64,
    #[serde(skip)]
    pub content: String,
}

impl FileRecord {
    /// Final path component
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Directory part of the relative path, empty for root-level files
    pub fn parent_dir(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }
}

/// Ordered set of [`FileRecord`]s produced by one scan.
///
/// Records are shared through `Arc` so graph edges and analysis tasks can
/// reference them without copying file contents.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    root: PathBuf,
    files: Vec<Arc<FileRecord>>,
    by_path: HashMap<String, usize>,
}

impl Manifest {
    /// Build a manifest, sorting records lexicographically by relative path
    pub fn new(root: impl Into<PathBuf>, mut files: Vec<FileRecord>) -> Self {
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        files.dedup_by(|a, b| a.relative_path == b.relative_path);

        let files: Vec<Arc<FileRecord>> = files.into_iter().map(Arc::new).collect();
        let by_path = files
            .iter()
            .enumerate()
            .map(|(i, f)| (f.relative_path.clone(), i))
            .collect();

        Self {
            root: root.into(),
            files,
            by_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[Arc<FileRecord>] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, relative_path: &str) -> Option<&Arc<FileRecord>> {
        self.by_path.get(relative_path).map(|&i| &self.files[i])
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.by_path.contains_key(relative_path)
    }

    /// Project name derived from the root directory
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| "project".to_string())
    }
}

#[cfg(test)]
pub(crate) fn record(path: &str, content: &str) -> FileRecord {
    FileRecord {
        relative_path: path.to_string(),
        absolute_path: PathBuf::from("/repo").join(path),
        language: Language::from_path(path),
        size_bytes: content.len() as u64,
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_sorted_and_indexed() {
        let manifest = Manifest::new(
            "/repo",
            vec![record("src/b.py", ""), record("a.py", ""), record("src/a.py", "")],
        );

        let paths: Vec<_> = manifest.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "src/a.py", "src/b.py"]);
        assert_eq!(manifest.get("src/b.py").unwrap().relative_path, "src/b.py");
        assert!(manifest.contains("a.py"));
        assert!(manifest.get("missing.py").is_none());
    }

    #[test]
    fn test_record_path_parts() {
        let r = record("src/pkg/mod.rs", "");
        assert_eq!(r.file_name(), "mod.rs");
        assert_eq!(r.parent_dir(), "src/pkg");

        let r = record("main.go", "");
        assert_eq!(r.file_name(), "main.go");
        assert_eq!(r.parent_dir(), "");
    }

    #[test]
    fn test_project_name() {
        let manifest = Manifest::new("/home/me/cool-project", vec![]);
        assert_eq!(manifest.project_name(), "cool-project");
    }
}

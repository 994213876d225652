//! Run manifest written next to the generated docs.
//!
//! Records what was generated, from which content, and how each file ended.
//! [`crate::index::DocIndex`] discovers doc sets through this file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::output::{DEPENDENCY_FILE, OVERVIEW_FILE, RUN_MANIFEST_FILE};
use crate::docs::{ProjectSummary, TaskStatus};
use crate::types::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub language: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub status: TaskStatus,
    pub attempts: u32,
    /// Companion doc, relative to the output root; absent for failed files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generator: String,
    pub version: String,
    pub project_name: String,
    pub source_root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub overview: String,
    pub dependencies: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub overview_from_llm: bool,
    pub files: Vec<FileEntry>,
}

impl RunManifest {
    pub fn from_summary(summary: &ProjectSummary, generated_at: DateTime<Utc>) -> Self {
        let files = summary
            .manifest
            .iter()
            .map(|file| {
                let path = file.relative_path.clone();
                let base = FileEntry {
                    language: file.language.as_str().to_string(),
                    size_bytes: file.size_bytes,
                    sha256: sha256_hex(file.content.as_bytes()),
                    status: TaskStatus::Pending,
                    attempts: 0,
                    doc_path: None,
                    error: None,
                    path,
                };
                if let Some(artifact) = summary.artifact(&file.relative_path) {
                    FileEntry {
                        status: artifact.task.status(),
                        attempts: artifact.task.attempt_count,
                        doc_path: Some(artifact.output_path.clone()),
                        ..base
                    }
                } else if let Some(failure) = summary.failure(&file.relative_path) {
                    FileEntry {
                        status: failure.task.status(),
                        attempts: failure.task.attempt_count,
                        error: Some(failure.error.to_string()),
                        ..base
                    }
                } else {
                    base
                }
            })
            .collect();

        Self {
            generator: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            project_name: summary.project_name.clone(),
            source_root: summary.manifest.root().to_path_buf(),
            generated_at,
            overview: OVERVIEW_FILE.to_string(),
            dependencies: DEPENDENCY_FILE.to_string(),
            total: summary.total(),
            succeeded: summary.succeeded(),
            failed: summary.failed(),
            overview_from_llm: summary.overview_from_llm,
            files,
        }
    }

    pub fn path_in(output_root: &Path) -> PathBuf {
        output_root.join(RUN_MANIFEST_FILE)
    }

    pub fn write(&self, output_root: &Path) -> Result<PathBuf> {
        let path = Self::path_in(output_root);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(output_root: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(Self::path_in(output_root))?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"abc").len(), 64);
    }
}

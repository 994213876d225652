//! Short project context shared by every per-file prompt.

use std::path::Path;

use tracing::debug;

use crate::constants::orchestrator::{PROJECT_CONTEXT_CHARS, PROJECT_CONTEXT_FILES};

/// Leading excerpt of each well-known project file found at `root`
pub fn project_context(root: &Path) -> String {
    let mut parts = Vec::new();

    for name in PROJECT_CONTEXT_FILES {
        let path = root.join(name);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let excerpt: String = content.chars().take(PROJECT_CONTEXT_CHARS).collect();
        let excerpt = excerpt.trim();
        if excerpt.is_empty() {
            continue;
        }
        debug!(file = %name, "Adding project context");
        parts.push(format!("{}:\n{}", name, excerpt));
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collects_known_files_in_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), "# Demo\nA demo project.").unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"demo\"").unwrap();
        std::fs::write(dir.path().join("other.txt"), "ignored").unwrap();

        let ctx = project_context(dir.path());
        assert!(ctx.starts_with("README.md:\n# Demo"));
        assert!(ctx.contains("Cargo.toml:\n[package]"));
        assert!(!ctx.contains("ignored"));
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), "x".repeat(5000)).unwrap();

        let ctx = project_context(dir.path());
        assert_eq!(ctx.len(), "README.md:\n".len() + PROJECT_CONTEXT_CHARS);
    }

    #[test]
    fn test_empty_when_nothing_found() {
        let dir = TempDir::new().unwrap();
        assert!(project_context(dir.path()).is_empty());
    }
}

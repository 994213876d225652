use glob::Pattern;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::warn;

use crate::constants::scanner::BUILTIN_IGNORES;
use crate::types::{DocError, Result};

/// Decides which directory entries the scanner prunes.
///
/// Patterns are matched against the entry name and against its path
/// relative to the repository root, so both `fixtures` and
/// `docs/generated/*` work.
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
    gitignore: Option<Gitignore>,
}

impl IgnoreRules {
    /// Built-in ignore set plus `extra` name globs
    pub fn new(extra: &[String]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(BUILTIN_IGNORES.len() + extra.len());
        for raw in BUILTIN_IGNORES.iter().copied().chain(extra.iter().map(String::as_str)) {
            let pattern = Pattern::new(raw)
                .map_err(|e| DocError::Config(format!("invalid ignore pattern '{}': {}", raw, e)))?;
            patterns.push(pattern);
        }
        Ok(Self {
            patterns,
            gitignore: None,
        })
    }

    /// Also honour `<root>/.gitignore` when it exists
    pub fn with_gitignore<P: AsRef<Path>>(mut self, root: P) -> Self {
        let gitignore_path = root.as_ref().join(".gitignore");
        if !gitignore_path.exists() {
            return self;
        }

        let mut builder = GitignoreBuilder::new(root.as_ref());
        if let Some(err) = builder.add(&gitignore_path) {
            warn!(path = %gitignore_path.display(), error = %err, "Partially invalid .gitignore");
        }
        self.gitignore = builder.build().ok();
        self
    }

    pub fn is_ignored(&self, name: &str, relative: &str, absolute: &Path, is_dir: bool) -> bool {
        if self
            .patterns
            .iter()
            .any(|p| p.matches(name) || p.matches(relative))
        {
            return true;
        }

        match &self.gitignore {
            Some(gi) => gi.matched(absolute, is_dir).is_ignore(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rules(extra: &[&str]) -> IgnoreRules {
        let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
        IgnoreRules::new(&extra).unwrap()
    }

    #[test]
    fn test_builtin_ignores() {
        let r = rules(&[]);
        let p = Path::new("/repo/x");
        assert!(r.is_ignored(".git", ".git", p, true));
        assert!(r.is_ignored("node_modules", "web/node_modules", p, true));
        assert!(r.is_ignored("mod.pyc", "pkg/mod.pyc", p, false));
        assert!(r.is_ignored("pkg.egg-info", "pkg.egg-info", p, true));
        assert!(!r.is_ignored("src", "src", p, true));
    }

    #[test]
    fn test_previous_output_dirs_ignored() {
        let r = rules(&[]);
        let p = Path::new("/repo/x");
        assert!(r.is_ignored("proj-docs-0a1b2c3d", "proj-docs-0a1b2c3d", p, true));
        assert!(!r.is_ignored("proj-docs-final", "proj-docs-final", p, true));
        assert!(r.is_ignored("proj-docusaurus", "proj-docusaurus", p, true));
    }

    #[test]
    fn test_extra_patterns_match_name_or_path() {
        let r = rules(&["fixtures", "docs/generated/*"]);
        let p = Path::new("/repo/x");
        assert!(r.is_ignored("fixtures", "tests/fixtures", p, true));
        assert!(r.is_ignored("api.md", "docs/generated/api.md", p, false));
        assert!(!r.is_ignored("api.md", "docs/api.md", p, false));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let result = IgnoreRules::new(&["[oops".to_string()]);
        assert!(matches!(result, Err(DocError::Config(_))));
    }

    #[test]
    fn test_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "secret.py\ngen/\n").unwrap();
        let r = rules(&[]).with_gitignore(dir.path());

        assert!(r.is_ignored("secret.py", "secret.py", &dir.path().join("secret.py"), false));
        assert!(r.is_ignored("gen", "gen", &dir.path().join("gen"), true));
        assert!(!r.is_ignored("app.py", "app.py", &dir.path().join("app.py"), false));
    }
}

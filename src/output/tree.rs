//! Navigation for the overview document: a tree of documented files and
//! quick links to notable ones.

use std::collections::BTreeMap;

use super::links::{doc_path, markdown_link};
use crate::constants::output::MAX_QUICK_LINKS;

#[derive(Debug, Default)]
struct Dir {
    dirs: BTreeMap<String, Dir>,
    /// file name → relative source path
    files: BTreeMap<String, String>,
}

/// Directory tree of documented source paths
#[derive(Debug, Default)]
pub struct DocTree {
    root: Dir,
}

impl DocTree {
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = Self::default();
        for path in paths {
            tree.insert(path);
        }
        tree
    }

    fn insert(&mut self, path: &str) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };
        let mut dir = &mut self.root;
        for part in parts {
            dir = dir.dirs.entry(part.to_string()).or_default();
        }
        dir.files.insert(file.to_string(), path.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.root.dirs.is_empty() && self.root.files.is_empty()
    }

    /// Nested markdown list; links are relative to `from_doc`
    pub fn render(&self, from_doc: &str) -> String {
        let mut out = String::new();
        render_dir(&self.root, 0, from_doc, &mut out);
        out
    }
}

fn render_dir(dir: &Dir, depth: usize, from_doc: &str, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, child) in &dir.dirs {
        out.push_str(&format!("{}- **{}/**\n", indent, name));
        render_dir(child, depth + 1, from_doc, out);
    }
    for (name, path) in &dir.files {
        out.push_str(&format!(
            "{}- {}\n",
            indent,
            markdown_link(name, from_doc, &doc_path(path))
        ));
    }
}

/// Groups of notable files for the overview's navigation section
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QuickLinks {
    pub main_components: Vec<String>,
    pub config_files: Vec<String>,
    pub test_files: Vec<String>,
}

const MAIN_KEYWORDS: &[&str] = &["main", "init", "app", "core", "base"];
const CONFIG_MARKERS: &[&str] = &[".toml", ".json", ".yaml", ".yml", ".ini", ".cfg", "config"];

impl QuickLinks {
    /// Classify `paths`; at most [`MAX_QUICK_LINKS`] per group, input order kept
    pub fn collect<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut links = Self::default();
        for path in paths {
            let lower = path.to_lowercase();
            let name = lower.rsplit('/').next().unwrap_or(lower.as_str());

            if MAIN_KEYWORDS.iter().any(|k| name.contains(k)) {
                push_capped(&mut links.main_components, path);
            }
            if CONFIG_MARKERS.iter().any(|m| lower.contains(m)) {
                push_capped(&mut links.config_files, path);
            }
            if lower.contains("test") {
                push_capped(&mut links.test_files, path);
            }
        }
        links
    }

    /// `- **Group**: [a](a.md), [b](b.md)` lines
    pub fn render(&self, from_doc: &str) -> String {
        let group = |title: &str, paths: &[String]| {
            let body = if paths.is_empty() {
                "none found".to_string()
            } else {
                paths
                    .iter()
                    .map(|p| {
                        let name = p.rsplit('/').next().unwrap_or(p.as_str());
                        markdown_link(name, from_doc, &doc_path(p))
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("- **{}**: {}\n", title, body)
        };

        let mut out = String::new();
        out.push_str(&group("Main components", &self.main_components));
        out.push_str(&group("Configuration files", &self.config_files));
        out.push_str(&group("Test files", &self.test_files));
        out
    }
}

fn push_capped(group: &mut Vec<String>, path: &str) {
    if group.len() < MAX_QUICK_LINKS {
        group.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_render_nested() {
        let tree = DocTree::new(["setup.py", "src/app.py", "src/util/io.py", "README.md"]);
        let md = tree.render("README.md");

        assert_eq!(
            md,
            "- **src/**\n  - **util/**\n    - [io.py](src/util/io.py.md)\n  - [app.py](src/app.py.md)\n- [README.md](README.md.md)\n- [setup.py](setup.py.md)\n"
        );
    }

    #[test]
    fn test_tree_links_relative_to_nested_doc() {
        let tree = DocTree::new(["a/b.py"]);
        assert!(tree.render("docs/intro.md").contains("[b.py](../a/b.py.md)"));
    }

    #[test]
    fn test_empty_tree() {
        let tree = DocTree::new(std::iter::empty());
        assert!(tree.is_empty());
        assert_eq!(tree.render("README.md"), "");
    }

    #[test]
    fn test_quick_links_groups() {
        let links = QuickLinks::collect([
            "src/main.py",
            "src/core/engine.py",
            "pyproject.toml",
            "config/settings.yaml",
            "tests/test_app.py",
        ]);

        assert_eq!(links.main_components, vec!["src/main.py", "tests/test_app.py"]);
        assert_eq!(links.config_files, vec!["pyproject.toml", "config/settings.yaml"]);
        assert_eq!(links.test_files, vec!["tests/test_app.py"]);
    }

    #[test]
    fn test_quick_links_capped() {
        let paths: Vec<String> = (0..9).map(|i| format!("tests/test_{}.py", i)).collect();
        let links = QuickLinks::collect(paths.iter().map(String::as_str));
        assert_eq!(links.test_files.len(), MAX_QUICK_LINKS);
    }

    #[test]
    fn test_quick_links_render() {
        let links = QuickLinks::collect(["src/app.py"]);
        let md = links.render("README.md");
        assert!(md.contains("- **Main components**: [app.py](src/app.py.md)"));
        assert!(md.contains("- **Test files**: none found"));
    }
}

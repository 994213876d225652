//! Best-effort mapping of raw dependency identifiers onto manifest files.
//!
//! Matching is purely string and path based. When several files qualify the
//! winner has the fewest path components, then the shortest path, then the
//! lexicographically smallest path.

use std::sync::Arc;

use crate::analyzer::Language;
use crate::types::{FileRecord, Manifest};

const JS_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "json"];

pub struct Resolver<'a> {
    manifest: &'a Manifest,
}

impl<'a> Resolver<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        Self { manifest }
    }

    pub fn resolve(&self, source: &FileRecord, identifier: &str) -> Option<Arc<FileRecord>> {
        let path = match source.language {
            Language::Python => self.python(source, identifier),
            Language::JavaScript | Language::TypeScript => self.javascript(source, identifier),
            Language::Java => self.java(identifier),
            Language::CFamily => self.c_include(source, identifier),
            Language::Rust => self.rust(source, identifier),
            Language::Go => self.go(identifier),
            Language::Php => self.php(source, identifier),
            Language::Config | Language::Markdown | Language::Unknown => None,
        }?;
        self.manifest.get(&path).cloned()
    }

    // =========================================================================
    // Per-language heuristics
    // =========================================================================

    fn python(&self, source: &FileRecord, id: &str) -> Option<String> {
        let level = id.chars().take_while(|c| *c == '.').count();
        let module = &id[level..];

        if level > 0 {
            let mut base = source.parent_dir().to_string();
            for _ in 1..level {
                base = parent_of(&base)?;
            }
            let rel = module.replace('.', "/");
            let stem = if rel.is_empty() { base } else { join(&base, &rel)? };
            return self.first_existing([
                format!("{}.py", stem),
                format!("{}.pyi", stem),
                join(&stem, "__init__.py")?,
            ]);
        }

        let rel = module.replace('.', "/");
        self.best_suffix_match(&[format!("{}.py", rel), format!("{}/__init__.py", rel)])
    }

    fn javascript(&self, source: &FileRecord, id: &str) -> Option<String> {
        let base = if id.starts_with("./") || id.starts_with("../") || id == "." || id == ".." {
            join(source.parent_dir(), id)?
        } else if let Some(rooted) = id.strip_prefix('/') {
            join("", rooted)?
        } else {
            // Bare specifiers name packages
            return None;
        };

        let mut candidates = vec![base.clone()];
        // `./x.js` in TypeScript sources usually points at `x.ts`
        if let Some((stem, ext)) = base.rsplit_once('.')
            && matches!(ext, "js" | "jsx" | "mjs" | "cjs")
        {
            candidates.extend(["ts", "tsx", "mts", "cts"].iter().map(|e| format!("{}.{}", stem, e)));
        }
        candidates.extend(JS_EXTENSIONS.iter().map(|e| format!("{}.{}", base, e)));
        candidates.extend(JS_EXTENSIONS.iter().map(|e| {
            if base.is_empty() {
                format!("index.{}", e)
            } else {
                format!("{}/index.{}", base, e)
            }
        }));
        self.first_existing(candidates)
    }

    fn java(&self, id: &str) -> Option<String> {
        if id.ends_with(".*") {
            return None;
        }
        let rel = id.replace('.', "/");
        self.best_suffix_match(&[format!("{}.java", rel)]).or_else(|| {
            // `import static a.B.member` names a member of a/B.java
            let (class, _) = rel.rsplit_once('/')?;
            self.best_suffix_match(&[format!("{}.java", class)])
        })
    }

    fn c_include(&self, source: &FileRecord, id: &str) -> Option<String> {
        let local = [join(source.parent_dir(), id), join("", id)];
        self.first_existing(local.into_iter().flatten())
            .or_else(|| self.best_suffix_match(&[id.to_string()]))
    }

    fn rust(&self, source: &FileRecord, id: &str) -> Option<String> {
        let mut segments: Vec<&str> = id.trim_start_matches("::").split("::").collect();
        let base = match segments.first().copied()? {
            "crate" => {
                segments.remove(0);
                self.rust_crate_root(source)?
            }
            "self" => {
                segments.remove(0);
                rust_module_dir(source)
            }
            "super" => {
                let mut dir = rust_module_dir(source);
                while segments.first() == Some(&"super") {
                    segments.remove(0);
                    dir = parent_of(&dir)?;
                }
                dir
            }
            _ => return None,
        };

        for take in (1..=segments.len()).rev() {
            let module = join(&base, &segments[..take].join("/"))?;
            if let Some(found) =
                self.first_existing([format!("{}.rs", module), join(&module, "mod.rs")?])
            {
                return Some(found);
            }
        }

        // Item defined directly in the base module
        let mut owners = vec![join(&base, "lib.rs")?, join(&base, "main.rs")?, join(&base, "mod.rs")?];
        if !base.is_empty() {
            owners.push(format!("{}.rs", base));
        }
        self.first_existing(owners)
    }

    fn rust_crate_root(&self, source: &FileRecord) -> Option<String> {
        let mut dir = source.parent_dir().to_string();
        loop {
            for root_file in ["lib.rs", "main.rs"] {
                if self.manifest.contains(&join(&dir, root_file)?) {
                    return Some(dir);
                }
            }
            if dir.is_empty() {
                return None;
            }
            dir = parent_of(&dir)?;
        }
    }

    /// Go imports name a package directory; the edge points at its first
    /// non-test file.
    fn go(&self, id: &str) -> Option<String> {
        let mut best: Option<(&str, &str)> = None;
        for file in self.manifest.iter() {
            if file.language != Language::Go || file.file_name().ends_with("_test.go") {
                continue;
            }
            let dir = file.parent_dir();
            if dir.is_empty() || !(id == dir || id.ends_with(&format!("/{}", dir))) {
                continue;
            }
            // Longer directory means a more specific match; manifest order
            // already yields the lexicographically first file per directory.
            if best.is_none_or(|(best_dir, _)| dir.len() > best_dir.len()) {
                best = Some((dir, file.relative_path.as_str()));
            }
        }
        best.map(|(_, path)| path.to_string())
    }

    fn php(&self, source: &FileRecord, id: &str) -> Option<String> {
        if id.ends_with(".php") || id.contains('/') {
            let local = [join(source.parent_dir(), id), join("", id)];
            return self
                .first_existing(local.into_iter().flatten())
                .or_else(|| self.best_suffix_match(&[id.trim_start_matches("./").to_string()]));
        }

        let rel = id.replace('\\', "/");
        self.best_suffix_match(&[format!("{}.php", rel)]).or_else(|| {
            // PSR-4 style: the vendor prefix maps onto a source directory
            let (_, rest) = rel.split_once('/')?;
            self.best_suffix_match(&[format!("{}.php", rest)])
        })
    }

    // =========================================================================
    // Matching helpers
    // =========================================================================

    fn first_existing<I: IntoIterator<Item = String>>(&self, candidates: I) -> Option<String> {
        candidates
            .into_iter()
            .find(|candidate| self.manifest.contains(candidate))
    }

    /// Manifest paths equal to, or ending in `/` + one of, the given suffixes
    fn best_suffix_match(&self, suffixes: &[String]) -> Option<String> {
        let matches = self.manifest.iter().map(|f| f.relative_path.as_str()).filter(|path| {
            suffixes.iter().any(|suffix| {
                !suffix.is_empty()
                    && (*path == suffix.as_str()
                        || (path.len() > suffix.len()
                            && path.ends_with(suffix.as_str())
                            && path.as_bytes()[path.len() - suffix.len() - 1] == b'/'))
            })
        });
        pick_best(matches).map(String::from)
    }
}

/// Fewest components, then shortest, then lexicographic
pub fn pick_best<'p, I: IntoIterator<Item = &'p str>>(candidates: I) -> Option<&'p str> {
    candidates
        .into_iter()
        .min_by_key(|path| (path.matches('/').count(), path.len(), *path))
}

/// Rust module directory: where `self::child` lives
fn rust_module_dir(source: &FileRecord) -> String {
    let name = source.file_name();
    if matches!(name, "mod.rs" | "lib.rs" | "main.rs") {
        return source.parent_dir().to_string();
    }
    let stem = name.strip_suffix(".rs").unwrap_or(name);
    join(source.parent_dir(), stem).unwrap_or_else(|| stem.to_string())
}

/// Join a relative path onto a directory, folding `.` and `..`.
/// Returns `None` when the result would escape the repository root.
pub fn join(dir: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

fn parent_of(dir: &str) -> Option<String> {
    if dir.is_empty() {
        return None;
    }
    Some(dir.rsplit_once('/').map(|(p, _)| p.to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::record;

    fn manifest(paths: &[&str]) -> Manifest {
        Manifest::new("/repo", paths.iter().map(|p| record(p, "")).collect())
    }

    fn resolve(m: &Manifest, source: &str, id: &str) -> Option<String> {
        let src = m.get(source).cloned().unwrap_or_else(|| Arc::new(record(source, "")));
        Resolver::new(m)
            .resolve(&src, id)
            .map(|f| f.relative_path.clone())
    }

    #[test]
    fn test_join() {
        assert_eq!(join("src/a", "../b/c.ts").as_deref(), Some("src/b/c.ts"));
        assert_eq!(join("src", "./x").as_deref(), Some("src/x"));
        assert_eq!(join("", "x/y").as_deref(), Some("x/y"));
        assert_eq!(join("src", "../../x"), None);
    }

    #[test]
    fn test_pick_best_tie_break() {
        let paths = ["z/util.py", "a/util.py", "util.py", "a/b/util.py"];
        assert_eq!(pick_best(paths), Some("util.py"));
        let paths = ["lib/util.py", "app/util.py"];
        assert_eq!(pick_best(paths), Some("app/util.py"));
        let paths = ["longer/util.py", "lib/util.py"];
        assert_eq!(pick_best(paths), Some("lib/util.py"));
    }

    #[test]
    fn test_python_absolute_and_package() {
        let m = manifest(&["a.py", "b.py", "pkg/__init__.py", "pkg/mod.py", "src/pkg/other.py"]);
        assert_eq!(resolve(&m, "a.py", "b").as_deref(), Some("b.py"));
        assert_eq!(resolve(&m, "a.py", "pkg").as_deref(), Some("pkg/__init__.py"));
        assert_eq!(resolve(&m, "a.py", "pkg.mod").as_deref(), Some("pkg/mod.py"));
        assert_eq!(resolve(&m, "a.py", "pkg.other").as_deref(), Some("src/pkg/other.py"));
        assert_eq!(resolve(&m, "a.py", "os"), None);
    }

    #[test]
    fn test_python_relative() {
        let m = manifest(&["pkg/__init__.py", "pkg/a.py", "pkg/b.py", "pkg/sub/c.py", "util.py"]);
        assert_eq!(resolve(&m, "pkg/a.py", ".b").as_deref(), Some("pkg/b.py"));
        assert_eq!(resolve(&m, "pkg/sub/c.py", "..a").as_deref(), Some("pkg/a.py"));
        assert_eq!(resolve(&m, "pkg/sub/c.py", "..").as_deref(), Some("pkg/__init__.py"));
        assert_eq!(resolve(&m, "pkg/a.py", "...util"), None);
    }

    #[test]
    fn test_python_ambiguous_prefers_shortest() {
        let m = manifest(&["x/helpers.py", "helpers.py", "y/z/helpers.py"]);
        assert_eq!(resolve(&m, "x/main.py", "helpers").as_deref(), Some("helpers.py"));
    }

    #[test]
    fn test_javascript_relative() {
        let m = manifest(&[
            "src/app.ts",
            "src/utils.ts",
            "src/components/index.tsx",
            "src/lib/api.ts",
            "src/legacy.js",
        ]);
        assert_eq!(resolve(&m, "src/app.ts", "./utils").as_deref(), Some("src/utils.ts"));
        assert_eq!(
            resolve(&m, "src/app.ts", "./components").as_deref(),
            Some("src/components/index.tsx")
        );
        assert_eq!(resolve(&m, "src/lib/api.ts", "../legacy.js").as_deref(), Some("src/legacy.js"));
        assert_eq!(resolve(&m, "src/app.ts", "./lib/api.js").as_deref(), Some("src/lib/api.ts"));
        assert_eq!(resolve(&m, "src/app.ts", "react"), None);
        assert_eq!(resolve(&m, "src/app.ts", "./missing"), None);
    }

    #[test]
    fn test_java() {
        let m = manifest(&["src/main/java/com/acme/Model.java", "src/main/java/com/acme/App.java"]);
        assert_eq!(
            resolve(&m, "src/main/java/com/acme/App.java", "com.acme.Model").as_deref(),
            Some("src/main/java/com/acme/Model.java")
        );
        assert_eq!(
            resolve(&m, "src/main/java/com/acme/App.java", "com.acme.Model.CONSTANT").as_deref(),
            Some("src/main/java/com/acme/Model.java")
        );
        assert_eq!(resolve(&m, "src/main/java/com/acme/App.java", "com.acme.*"), None);
        assert_eq!(resolve(&m, "src/main/java/com/acme/App.java", "java.util.List"), None);
    }

    #[test]
    fn test_c_include() {
        let m = manifest(&["src/main.c", "src/util.h", "include/proj/api.h"]);
        assert_eq!(resolve(&m, "src/main.c", "util.h").as_deref(), Some("src/util.h"));
        assert_eq!(resolve(&m, "src/main.c", "proj/api.h").as_deref(), Some("include/proj/api.h"));
        assert_eq!(resolve(&m, "src/main.c", "stdio.h"), None);
    }

    #[test]
    fn test_rust_paths() {
        let m = manifest(&[
            "src/lib.rs",
            "src/types/mod.rs",
            "src/types/error.rs",
            "src/graph.rs",
            "src/graph/resolver.rs",
        ]);
        assert_eq!(
            resolve(&m, "src/graph.rs", "crate::types::error::DocError").as_deref(),
            Some("src/types/error.rs")
        );
        assert_eq!(resolve(&m, "src/graph.rs", "crate::types").as_deref(), Some("src/types/mod.rs"));
        assert_eq!(resolve(&m, "src/graph.rs", "self::resolver").as_deref(), Some("src/graph/resolver.rs"));
        assert_eq!(resolve(&m, "src/graph/resolver.rs", "super::Thing").as_deref(), Some("src/graph.rs"));
        assert_eq!(resolve(&m, "src/types/error.rs", "super::super::graph").as_deref(), Some("src/graph.rs"));
        assert_eq!(resolve(&m, "src/graph.rs", "crate::Config").as_deref(), Some("src/lib.rs"));
        assert_eq!(resolve(&m, "src/graph.rs", "std::collections"), None);
    }

    #[test]
    fn test_go_package_dir() {
        let m = manifest(&[
            "cmd/main.go",
            "internal/util/a.go",
            "internal/util/b.go",
            "internal/util/a_test.go",
        ]);
        assert_eq!(
            resolve(&m, "cmd/main.go", "example.com/proj/internal/util").as_deref(),
            Some("internal/util/a.go")
        );
        assert_eq!(resolve(&m, "cmd/main.go", "fmt"), None);
    }

    #[test]
    fn test_php() {
        let m = manifest(&["index.php", "lib/helpers.php", "app/Models/User.php"]);
        assert_eq!(resolve(&m, "index.php", "lib/helpers.php").as_deref(), Some("lib/helpers.php"));
        assert_eq!(resolve(&m, "index.php", "App\\Models\\User").as_deref(), Some("app/Models/User.php"));
        assert_eq!(resolve(&m, "index.php", "Vendor\\Thing"), None);
    }
}

//! Language Classification
//!
//! Maps file extensions onto the closed set of languages the scanner accepts.
//! Every other module asks this table; nothing else inspects extensions.
//!
//! ```rust,ignore
//! use repodoc::analyzer::Language;
//!
//! let lang = Language::from_path("src/main.rs");
//! assert_eq!(lang, Language::Rust);
//! assert_eq!(lang.highlight_str(), "rust");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Language Metadata Table
// =============================================================================

struct LanguageMeta {
    /// Display name (human-readable)
    display_name: &'static str,
    /// Identifier for markdown code fences
    highlight_str: &'static str,
    /// File extensions that map to this language (lowercase, no dot)
    extensions: &'static [&'static str],
    /// Alternative names accepted by `FromStr`
    aliases: &'static [&'static str],
    /// Whether files of this language can declare dependencies
    has_dependencies: bool,
}

macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*], [$($alias:literal),*], $deps:literal) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            has_dependencies: $deps,
        }
    };
}

impl Language {
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::Python => lang_meta!("Python", "python", ["py", "pyi", "pyw"], ["python", "py"], true),
            Language::JavaScript => lang_meta!("JavaScript", "javascript", ["js", "jsx", "mjs", "cjs"], ["javascript", "js", "jsx"], true),
            Language::TypeScript => lang_meta!("TypeScript", "typescript", ["ts", "tsx", "mts", "cts"], ["typescript", "ts", "tsx"], true),
            Language::Java => lang_meta!("Java", "java", ["java"], ["java"], true),
            Language::CFamily => lang_meta!("C/C++", "cpp", ["c", "h", "cpp", "cc", "cxx", "hpp", "hh", "hxx"], ["c", "cpp", "c++", "c/c++"], true),
            Language::Rust => lang_meta!("Rust", "rust", ["rs"], ["rust", "rs"], true),
            Language::Go => lang_meta!("Go", "go", ["go"], ["go", "golang"], true),
            Language::Php => lang_meta!("PHP", "php", ["php"], ["php"], true),
            Language::Config => lang_meta!("Config", "toml", ["toml", "yaml", "yml", "json", "ini", "cfg"], ["config", "toml", "yaml", "json"], false),
            Language::Markdown => lang_meta!("Markdown", "markdown", ["md", "markdown"], ["markdown", "md"], false),
            Language::Unknown => lang_meta!("Unknown", "text", [], ["unknown", "text"], false),
        }
    }
}

// =============================================================================
// Language Enum Definition
// =============================================================================

/// Languages recognized by the scanner.
///
/// `CFamily` covers both C and C++ sources and headers. `Config` covers
/// structured configuration files (TOML, YAML, JSON, INI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    CFamily,
    Rust,
    Go,
    Php,
    Config,
    Markdown,
    #[default]
    Unknown,
}

impl Language {
    /// Display name (human-readable)
    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Identifier for ```lang code fences
    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    /// Detect language from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();
        Self::all_variants()
            .iter()
            .copied()
            .find(|lang| lang.meta().extensions.contains(&ext_lower.as_str()))
            .unwrap_or(Language::Unknown)
    }

    /// Detect language from file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Check if this is a known language (not Unknown)
    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Whether dependency extraction applies to this language
    pub fn has_dependencies(&self) -> bool {
        self.meta().has_dependencies
    }

    /// Extensions mapped to this language
    pub fn extensions(&self) -> &'static [&'static str] {
        self.meta().extensions
    }

    /// All known languages (Unknown excluded)
    pub fn all_variants() -> &'static [Language] {
        &[
            Language::Python, Language::JavaScript, Language::TypeScript,
            Language::Java, Language::CFamily, Language::Rust, Language::Go,
            Language::Php, Language::Config, Language::Markdown,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_lowercase();

        if let Some(lang) = Self::all_variants()
            .iter()
            .find(|lang| lang.meta().aliases.contains(&s_lower.as_str()))
        {
            return Ok(*lang);
        }

        if s_lower.is_empty() || s_lower == "unknown" || s_lower == "text" {
            return Ok(Language::Unknown);
        }

        Err(format!("unknown language '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("jsx"), Language::JavaScript);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("hpp"), Language::CFamily);
        assert_eq!(Language::from_extension("h"), Language::CFamily);
        assert_eq!(Language::from_extension("yml"), Language::Config);
        assert_eq!(Language::from_extension("md"), Language::Markdown);
        assert_eq!(Language::from_extension("php"), Language::Php);
        assert_eq!(Language::from_extension("xyz"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("cmd/server/main.go"), Language::Go);
        assert_eq!(Language::from_path("Cargo.toml"), Language::Config);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
        assert_eq!(Language::from_path("archive.tar.gz"), Language::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::CFamily.to_string(), "C/C++");
        assert_eq!(Language::TypeScript.to_string(), "TypeScript");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("python".parse::<Language>(), Ok(Language::Python));
        assert_eq!("C++".parse::<Language>(), Ok(Language::CFamily));
        assert_eq!("golang".parse::<Language>(), Ok(Language::Go));
        assert_eq!("".parse::<Language>(), Ok(Language::Unknown));
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_dependency_support() {
        assert!(Language::Python.has_dependencies());
        assert!(Language::Go.has_dependencies());
        assert!(!Language::Config.has_dependencies());
        assert!(!Language::Markdown.has_dependencies());
        assert!(!Language::Unknown.has_dependencies());
    }

    #[test]
    fn test_extensions_do_not_overlap() {
        let mut seen = std::collections::HashSet::new();
        for lang in Language::all_variants() {
            for ext in lang.extensions() {
                assert!(seen.insert(*ext), "extension {} mapped twice", ext);
            }
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Language::CFamily).unwrap();
        assert_eq!(json, "\"CFamily\"");
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::CFamily);
    }
}

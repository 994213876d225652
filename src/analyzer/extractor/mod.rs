//! Dependency Extraction
//!
//! Returns the raw dependency identifiers a file declares, in first-seen
//! order with duplicates removed and the original spelling kept. Resolution
//! against the manifest happens later in [`crate::graph`].
//!
//! Each language is handled by one pure function registered in [`RULES`].
//! Languages without an entry (config, markdown) declare nothing.

mod c_family;
mod go;
mod java;
mod javascript;
mod php;
mod python;
mod rust_lang;

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use tracing::{debug, warn};

use crate::analyzer::Language;
use crate::types::{ExtractionWarning, FileRecord, Manifest};

/// Output of a single language rule
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RuleOutput {
    pub identifiers: Vec<String>,
    /// Set when the preferred strategy failed and a fallback produced the result
    pub degraded: Option<String>,
}

impl RuleOutput {
    pub fn exact(identifiers: Vec<String>) -> Self {
        Self {
            identifiers,
            degraded: None,
        }
    }
}

/// A language rule: file content in, identifiers out
pub type RuleFn = fn(&str) -> Result<RuleOutput, String>;

/// Dispatch table keyed by language
pub const RULES: &[(Language, RuleFn)] = &[
    (Language::Python, python::extract),
    (Language::JavaScript, javascript::extract),
    (Language::TypeScript, javascript::extract),
    (Language::Java, java::extract),
    (Language::CFamily, c_family::extract),
    (Language::Rust, rust_lang::extract),
    (Language::Go, go::extract),
    (Language::Php, php::extract),
];

pub fn rule_for(language: Language) -> Option<RuleFn> {
    RULES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, rule)| *rule)
}

/// Identifiers for one file plus the warning, if extraction was not clean
#[derive(Debug, Default)]
pub struct Extraction {
    pub identifiers: Vec<String>,
    pub warning: Option<ExtractionWarning>,
}

/// Extract dependency identifiers from one file. Never fails.
pub fn extract(record: &FileRecord) -> Vec<String> {
    extract_with_warning(record).identifiers
}

pub fn extract_with_warning(record: &FileRecord) -> Extraction {
    let Some(rule) = rule_for(record.language) else {
        return Extraction::default();
    };

    match rule(&record.content) {
        Ok(output) => {
            let warning = output.degraded.map(|message| {
                warn!(path = %record.relative_path, reason = %message, "Dependency extraction degraded");
                ExtractionWarning {
                    path: record.relative_path.clone(),
                    message,
                    degraded: true,
                }
            });
            Extraction {
                identifiers: dedup_ordered(output.identifiers),
                warning,
            }
        }
        Err(message) => {
            warn!(path = %record.relative_path, error = %message, "Dependency extraction failed");
            Extraction {
                identifiers: Vec::new(),
                warning: Some(ExtractionWarning {
                    path: record.relative_path.clone(),
                    message,
                    degraded: false,
                }),
            }
        }
    }
}

/// Per-file identifier lists for a whole manifest
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Keyed by relative path; every manifest file has an entry
    pub edge_lists: BTreeMap<String, Vec<String>>,
    pub warnings: Vec<ExtractionWarning>,
}

pub fn extract_all(manifest: &Manifest) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    for record in manifest.iter() {
        let extraction = extract_with_warning(record);
        debug!(
            path = %record.relative_path,
            count = extraction.identifiers.len(),
            "Extracted dependencies"
        );
        if let Some(warning) = extraction.warning {
            report.warnings.push(warning);
        }
        report
            .edge_lists
            .insert(record.relative_path.clone(), extraction.identifiers);
    }
    report
}

/// Remove duplicates, keeping the first occurrence
pub(crate) fn dedup_ordered(identifiers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(identifiers.len());
    identifiers
        .into_iter()
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

/// First capture group of every pattern, ordered by position in `content`
pub(crate) fn ordered_captures(content: &str, patterns: &[&Regex]) -> Vec<String> {
    let mut hits: Vec<(usize, &str)> = patterns
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, s)| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::record;
    use proptest::prelude::*;

    #[test]
    fn test_every_dependency_language_has_a_rule() {
        for lang in Language::all_variants() {
            assert_eq!(
                rule_for(*lang).is_some(),
                lang.has_dependencies(),
                "rule table out of sync for {:?}",
                lang
            );
        }
    }

    #[test]
    fn test_config_and_markdown_declare_nothing() {
        assert!(extract(&record("Cargo.toml", "[dependencies]\nserde = \"1\"\n")).is_empty());
        assert!(extract(&record("README.md", "import os\n")).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let ids = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedup_ordered(ids), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_degraded_python_produces_warning() {
        let extraction = extract_with_warning(&record("broken.py", "import os\ndef f(:\n"));
        assert_eq!(extraction.identifiers, vec!["os"]);
        let warning = extraction.warning.unwrap();
        assert!(warning.degraded);
        assert_eq!(warning.path, "broken.py");
    }

    #[test]
    fn test_extract_all_covers_every_file() {
        let manifest = Manifest::new(
            "/repo",
            vec![
                record("a.py", "import b\n"),
                record("b.py", ""),
                record("notes.md", "# notes"),
            ],
        );
        let report = extract_all(&manifest);
        assert_eq!(report.edge_lists.len(), 3);
        assert_eq!(report.edge_lists["a.py"], vec!["b"]);
        assert!(report.edge_lists["b.py"].is_empty());
        assert!(report.warnings.is_empty());
    }

    fn import_free_source() -> impl Strategy<Value = String> {
        proptest::collection::vec(("x[a-z]{0,6}", 0u32..1000), 0..12).prop_map(|lines| {
            lines
                .into_iter()
                .map(|(name, n)| format!("{} = {}\n", name, n))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_no_imports_means_no_identifiers(
            body in import_free_source(),
            ext in prop::sample::select(vec!["py", "js", "ts", "java", "c", "rs", "go", "php"]),
        ) {
            let rec = record(&format!("file.{}", ext), &body);
            let extraction = extract_with_warning(&rec);
            prop_assert!(extraction.identifiers.is_empty());
        }
    }
}

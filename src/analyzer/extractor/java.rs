use std::sync::LazyLock;

use regex::Regex;

use super::{RuleOutput, ordered_captures};

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*(?:\.\*)?)\s*;")
        .expect("valid regex")
});

pub fn extract(content: &str) -> Result<RuleOutput, String> {
    Ok(RuleOutput::exact(ordered_captures(content, &[&IMPORT])))
}

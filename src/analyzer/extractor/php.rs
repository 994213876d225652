use std::sync::LazyLock;

use regex::Regex;

use super::{RuleOutput, ordered_captures};

static USE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*use\s+(?:function\s+|const\s+)?\\?([A-Za-z_]\w*(?:\\[A-Za-z_]\w*)*)")
        .expect("valid regex")
});
static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|include)(?:_once)?\s*\(?\s*['"]([^'"\n]+)['"]"#)
        .expect("valid regex")
});

/// Namespace `use` declarations and `require`/`include` of literal paths
pub fn extract(content: &str) -> Result<RuleOutput, String> {
    Ok(RuleOutput::exact(ordered_captures(
        content,
        &[&USE_DECL, &REQUIRE],
    )))
}

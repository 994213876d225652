use std::sync::LazyLock;

use regex::Regex;

use super::RuleOutput;

/// Whole use tree of a `use` declaration, up to the `;`
static USE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\s*\([^)]*\))?\s+)?use\s+([^;]+);").expect("valid regex")
});
/// Out-of-line module declaration; inline `mod x { .. }` has no file
static MOD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\s*\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)\s*;").expect("valid regex")
});
static EXTERN_CRATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*extern\s+crate\s+([A-Za-z_]\w*)").expect("valid regex")
});

pub fn extract(content: &str) -> Result<RuleOutput, String> {
    let mut hits: Vec<(usize, Vec<String>)> = Vec::new();

    for caps in USE_DECL.captures_iter(content) {
        if let Some(tree) = caps.get(1) {
            hits.push((tree.start(), expand_use_tree(tree.as_str())));
        }
    }
    // `mod x;` declares the child module `self::x`
    for caps in MOD_DECL.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            hits.push((name.start(), vec![format!("self::{}", name.as_str())]));
        }
    }
    for caps in EXTERN_CRATE.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            hits.push((name.start(), vec![name.as_str().to_string()]));
        }
    }

    hits.sort_by_key(|(pos, _)| *pos);
    Ok(RuleOutput::exact(
        hits.into_iter().flat_map(|(_, ids)| ids).collect(),
    ))
}

/// `a::{b, c::D, e::{f, g}}` → `a::b`, `a::c::D`, `a::e`.
///
/// One level of braces is expanded; deeper groups keep their prefix only.
fn expand_use_tree(tree: &str) -> Vec<String> {
    let tree: String = tree.split_whitespace().collect::<Vec<_>>().join(" ");
    let Some(open) = tree.find('{') else {
        return simple_path(&tree).into_iter().collect();
    };
    let close = tree.rfind('}').unwrap_or(tree.len());
    if close <= open {
        return Vec::new();
    }

    let prefix = tree[..open].trim().trim_end_matches("::");
    split_top_level(&tree[open + 1..close])
        .into_iter()
        .filter_map(|item| {
            if item == "*" || item == "self" {
                return (!prefix.is_empty()).then(|| prefix.to_string());
            }
            let item = match item.find('{') {
                Some(brace) => item[..brace].trim().trim_end_matches("::"),
                None => item,
            };
            let item = simple_path(item)?;
            Some(if prefix.is_empty() {
                item
            } else {
                format!("{}::{}", prefix, item)
            })
        })
        .collect()
}

/// Drop `as` renames and glob suffixes; `None` for an empty path
fn simple_path(path: &str) -> Option<String> {
    let path = path.split(" as ").next().unwrap_or(path).trim();
    let path = path.trim_end_matches('*').trim_end_matches("::").trim();
    // `a::b::self` names `a::b`
    let path = path.strip_suffix("::self").unwrap_or(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Split on commas that are not nested inside braces
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

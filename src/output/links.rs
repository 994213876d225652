//! Companion-doc naming and relative link computation.
//!
//! All paths here are `/`-separated and relative to the output root.

use crate::constants::output::DOC_SUFFIX;

/// Companion doc path for a source file: `src/a.py` → `src/a.py.md`
pub fn doc_path(relative_path: &str) -> String {
    format!("{}{}", relative_path, DOC_SUFFIX)
}

/// Link from the document at `from_doc` to the document at `to_doc`
pub fn relative_link(from_doc: &str, to_doc: &str) -> String {
    let from_dir: Vec<&str> = match from_doc.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|p| !p.is_empty()).collect(),
        None => Vec::new(),
    };
    let to: Vec<&str> = to_doc.split('/').filter(|p| !p.is_empty()).collect();

    let common = from_dir
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // Never consume the file name itself as a shared component
    let common = common.min(to.len().saturating_sub(1));

    let mut parts: Vec<&str> = std::iter::repeat_n("..", from_dir.len() - common).collect();
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Markdown link destination, bracketed when it contains spaces or parens
pub fn destination(link: &str) -> String {
    if link.contains([' ', '(', ')', '<', '>']) {
        format!("<{}>", link.replace('<', "%3C").replace('>', "%3E"))
    } else {
        link.to_string()
    }
}

/// `[label](link)` from `from_doc` to `to_doc`
pub fn markdown_link(label: &str, from_doc: &str, to_doc: &str) -> String {
    format!(
        "[{}]({})",
        escape_label(label),
        destination(&relative_link(from_doc, to_doc))
    )
}

fn escape_label(label: &str) -> String {
    label.replace('[', "\\[").replace(']', "\\]")
}

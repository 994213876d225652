use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Parser};

use super::RuleOutput;

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+(.+)$").expect("valid regex"));
static FROM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^from\s+(\.+[A-Za-z_][\w.]*|\.+|[A-Za-z_][\w.]*)\s+import\s+(.+)$")
        .expect("valid regex")
});
static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*$").expect("valid regex")
});

/// AST pass over `import` / `from ... import` statements, falling back to a
/// line-based regex pass when the source does not parse cleanly.
pub fn extract(content: &str) -> Result<RuleOutput, String> {
    match extract_ast(content) {
        Ok(identifiers) => Ok(RuleOutput::exact(identifiers)),
        Err(reason) => Ok(RuleOutput {
            identifiers: extract_regex(content),
            degraded: Some(format!("{}; used pattern fallback", reason)),
        }),
    }
}

fn extract_ast(content: &str) -> Result<Vec<String>, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| format!("python grammar unavailable: {}", e))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| "parser returned no tree".to_string())?;
    let root = tree.root_node();
    if root.has_error() {
        return Err("syntax error".to_string());
    }

    let src = content.as_bytes();
    let mut out = Vec::new();
    let mut cursor = root.walk();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                for name in node.children_by_field_name("name", &mut cursor) {
                    if let Some(dotted) = imported_module(name) {
                        out.push(text(dotted, src));
                    }
                }
            }
            "import_from_statement" => {
                let Some(module) = node.child_by_field_name("module_name") else {
                    continue;
                };
                let module = text(module, src);
                if is_bare_relative(&module) {
                    for name in node.children_by_field_name("name", &mut cursor) {
                        if let Some(dotted) = imported_module(name) {
                            out.push(format!("{}{}", module, text(dotted, src)));
                        }
                    }
                } else {
                    out.push(module);
                }
            }
            "future_import_statement" => out.push("__future__".to_string()),
            _ => {
                let children: Vec<Node> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    Ok(out)
}

/// `a.b` in `import a.b` or `import a.b as c`
fn imported_module(name: Node) -> Option<Node> {
    match name.kind() {
        "dotted_name" => Some(name),
        "aliased_import" => name.child_by_field_name("name"),
        _ => None,
    }
}

fn text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src)
        .unwrap_or("")
        .split_whitespace()
        .collect()
}

/// `.` or `..` with no module after the dots
fn is_bare_relative(module: &str) -> bool {
    !module.is_empty() && module.chars().all(|c| c == '.')
}

fn extract_regex(content: &str) -> Vec<String> {
    let mut out = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if let Some(caps) = IMPORT_LINE.captures(line) {
            for part in caps[1].split(',') {
                if let Some(module) = part.split_whitespace().next()
                    && DOTTED.is_match(module)
                {
                    out.push(module.to_string());
                }
            }
        } else if let Some(caps) = FROM_LINE.captures(line) {
            let module = &caps[1];
            if is_bare_relative(module) {
                let names = caps[2].trim_matches(|c| c == '(' || c == ')' || c == '\\');
                for part in names.split(',') {
                    if let Some(name) = part.split_whitespace().next()
                        && DOTTED.is_match(name)
                    {
                        out.push(format!("{}{}", module, name));
                    }
                }
            } else {
                out.push(module.to_string());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(content: &str) -> Vec<String> {
        extract(content).unwrap().identifiers
    }

    #[test]
    fn test_plain_and_aliased_imports() {
        let src = "import os\nimport numpy as np, sys\nimport a.b.c\n";
        assert_eq!(ids(src), vec!["os", "numpy", "sys", "a.b.c"]);
    }

    #[test]
    fn test_from_imports_keep_relative_syntax() {
        let src = "from pkg.mod import thing\nfrom .sibling import x\nfrom ..parent.mod import y\n";
        assert_eq!(ids(src), vec!["pkg.mod", ".sibling", "..parent.mod"]);
    }

    #[test]
    fn test_bare_relative_import_names_modules() {
        let src = "from . import alpha, beta as b\nfrom .. import (gamma)\n";
        assert_eq!(ids(src), vec![".alpha", ".beta", "..gamma"]);
    }

    #[test]
    fn test_nested_imports_in_source_order() {
        let src = "import first\n\ndef f():\n    import inner\n    try:\n        import opt\n    except ImportError:\n        pass\n\nimport last\n";
        assert_eq!(ids(src), vec!["first", "inner", "opt", "last"]);
    }

    #[test]
    fn test_future_import() {
        assert_eq!(ids("from __future__ import annotations\n"), vec!["__future__"]);
    }

    #[test]
    fn test_strings_are_not_imports() {
        let src = "doc = \"\"\"\nimport fake\n\"\"\"\nx = 'from y import z'\n";
        let out = extract(src).unwrap();
        assert!(out.identifiers.is_empty());
        assert!(out.degraded.is_none());
    }

    #[test]
    fn test_syntax_error_falls_back_to_regex() {
        let src = "import os\nfrom .util import helper\nfrom . import a, b\ndef broken(:\n    import json\n";
        let out = extract(src).unwrap();
        assert!(out.degraded.is_some());
        assert_eq!(out.identifiers, vec!["os", ".util", ".a", ".b", "json"]);
    }

    #[test]
    fn test_empty_file() {
        let out = extract("").unwrap();
        assert!(out.identifiers.is_empty());
        assert!(out.degraded.is_none());
    }
}

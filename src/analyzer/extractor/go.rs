use std::sync::LazyLock;

use regex::Regex;

use super::RuleOutput;

/// Optional alias (`_`, `.`, or a name) followed by a quoted path
static SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[A-Za-z_.][\w.]*\s+)?"([^"]+)""#).expect("valid regex")
});

/// Single-line `import "x"` and block `import ( ... )` declarations
pub fn extract(content: &str) -> Result<RuleOutput, String> {
    let mut out = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let line = line.trim();

        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(caps) = SPEC.captures(line) {
                out.push(caps[1].to_string());
            }
            continue;
        }

        let Some(rest) = line.strip_prefix("import") else {
            continue;
        };
        if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            continue;
        }
        let rest = rest.trim_start();

        if let Some(block) = rest.strip_prefix('(') {
            // `import ( "a"; "b" )` may close on the same line
            let (inner, closed) = match block.split_once(')') {
                Some((inner, _)) => (inner, true),
                None => (block, false),
            };
            for spec in inner.split(';') {
                if let Some(caps) = SPEC.captures(spec.trim()) {
                    out.push(caps[1].to_string());
                }
            }
            in_block = !closed;
        } else if let Some(caps) = SPEC.captures(rest) {
            out.push(caps[1].to_string());
        }
    }

    Ok(RuleOutput::exact(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_block_imports() {
        let src = r#"package main

import "fmt"
import log "github.com/sirupsen/logrus"

import (
	"os"
	_ "github.com/lib/pq"
	. "math"
	util "example.com/proj/internal/util" // helpers
)

func main() {}
"#;
        assert_eq!(
            extract(src).unwrap().identifiers,
            vec![
                "fmt",
                "github.com/sirupsen/logrus",
                "os",
                "github.com/lib/pq",
                "math",
                "example.com/proj/internal/util"
            ]
        );
    }

    #[test]
    fn test_one_line_block() {
        assert_eq!(
            extract("import ( \"a\"; \"b\" )\nvar x = 1\n").unwrap().identifiers,
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_identifier_starting_with_import_ignored() {
        assert!(extract("importantValue := \"x\"\n").unwrap().identifiers.is_empty());
    }
}

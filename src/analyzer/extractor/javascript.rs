use std::sync::LazyLock;

use regex::Regex;

use super::{RuleOutput, ordered_captures};

/// `import x from 'm'`, `import { a,\n b } from 'm'`, `export * from 'm'`
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\b[^;'"]*?\bfrom\s*['"]([^'"\n]+)['"]"#)
        .expect("valid regex")
});
/// `import 'm'`
static SIDE_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s*['"]([^'"\n]+)['"]"#).expect("valid regex")
});
/// `require('m')`
static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});
/// `import('m')`
static DYNAMIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// ES module and CommonJS patterns, shared by JavaScript and TypeScript
pub fn extract(content: &str) -> Result<RuleOutput, String> {
    Ok(RuleOutput::exact(ordered_captures(
        content,
        &[&FROM_CLAUSE, &SIDE_EFFECT, &REQUIRE, &DYNAMIC],
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(content: &str) -> Vec<String> {
        extract(content).unwrap().identifiers
    }

    #[test]
    fn test_es_module_forms() {
        let src = r#"import React from 'react';
import { a, b } from "./utils";
import * as path from 'node:path';
import type { Props } from './types';
import './styles.css';
export { x } from '../shared/x';
export * from './reexport';
"#;
        assert_eq!(
            ids(src),
            vec![
                "react",
                "./utils",
                "node:path",
                "./types",
                "./styles.css",
                "../shared/x",
                "./reexport"
            ]
        );
    }

    #[test]
    fn test_multiline_named_import() {
        let src = "import {\n  alpha,\n  beta,\n} from './greek';\nconst z = 1;\n";
        assert_eq!(ids(src), vec!["./greek"]);
    }

    #[test]
    fn test_commonjs_and_dynamic() {
        let src = "const fs = require('fs');\nconst m = await import('./lazy.js');\nconst { x } = require(\"../lib/x\");\n";
        assert_eq!(ids(src), vec!["fs", "./lazy.js", "../lib/x"]);
    }

    #[test]
    fn test_order_is_position_based() {
        let src = "const a = require('a');\nimport b from 'b';\n";
        assert_eq!(ids(src), vec!["a", "b"]);
    }

    #[test]
    fn test_commented_import_line_ignored() {
        assert!(ids("// import x from 'y'\nconst q = 2;\n").is_empty());
    }
}

use std::sync::LazyLock;

use regex::Regex;

use super::{RuleOutput, ordered_captures};

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*#\s*include\s*[<"]([^>"\n]+)[>"]"#).expect("valid regex")
});

/// `#include` directives, both `"local.h"` and `<system>` forms
pub fn extract(content: &str) -> Result<RuleOutput, String> {
    Ok(RuleOutput::exact(ordered_captures(content, &[&INCLUDE])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes() {
        let src = "#include <stdio.h>\n#include \"util/strings.h\"\n  #  include <vector>\nint main() { return 0; }\n";
        assert_eq!(
            extract(src).unwrap().identifiers,
            vec!["stdio.h", "util/strings.h", "vector"]
        );
    }

    #[test]
    fn test_commented_include_skipped() {
        assert!(extract("// #include <x.h>\nint y;\n").unwrap().identifiers.is_empty());
    }
}

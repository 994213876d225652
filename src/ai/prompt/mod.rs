//! Prompt construction.
//!
//! Per-file, overview and dependency-narrative prompts are assembled from
//! sections rendered in insertion order, so the same inputs always produce
//! the same prompt text.

#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Opening instruction
    Task(String),
    /// Headings the answer must use, in order
    Outline(Vec<String>),
    /// `**key**: value` lines sharing one context block
    Context(Vec<(String, String)>),
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced source listing
    Source { language: String, content: String },
    /// Constraints on the answer
    Rules(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, instruction: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Task(instruction.into()));
        self
    }

    pub fn outline<I, S>(mut self, headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .push(PromptSection::Outline(headings.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a context item; items share one context block
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        let existing = self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        });
        match existing {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn source(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Source {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .push(PromptSection::Rules(rules.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();
        for section in self.sections {
            match section {
                PromptSection::Task(instruction) => {
                    prompt.push_str(&instruction);
                    prompt.push_str("\n\n");
                }
                PromptSection::Outline(headings) => {
                    prompt.push_str("## Expected structure\n\n");
                    push_list(&mut prompt, &headings);
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Source { language, content } => {
                    let fence = code_fence(&content);
                    prompt.push_str(&format!("{}{}\n{}\n{}\n\n", fence, language, content, fence));
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("## Rules\n\n");
                    push_list(&mut prompt, &rules);
                }
            }
        }
        prompt.trim_end().to_string()
    }
}

fn push_list(prompt: &mut String, items: &[String]) {
    for item in items {
        prompt.push_str(&format!("- {}\n", item));
    }
    prompt.push('\n');
}

/// A backtick fence longer than any run of backticks inside `content`
fn code_fence(content: &str) -> String {
    let longest = content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Cut `content` to at most `max_chars` characters on a char boundary.
///
/// Returns the text and whether anything was dropped; a marker line is
/// appended when truncated.
pub fn truncate_chars(content: &str, max_chars: usize) -> (String, bool) {
    match content.char_indices().nth(max_chars) {
        None => (content.to_string(), false),
        Some((cut, _)) => {
            let omitted = content[cut..].chars().count();
            (
                format!(
                    "{}\n... [truncated {} characters]",
                    &content[..cut],
                    omitted
                ),
                true,
            )
        }
    }
}

const MARKDOWN_ONLY: &str = "Answer with the markdown document only, no commentary around it";

/// Preset prompts for the documentation pipeline
pub struct PromptTemplates;

impl PromptTemplates {
    /// Companion doc for one source file
    pub fn file_documentation(path: &str, language: &str) -> PromptBuilder {
        PromptBuilder::new()
            .task(format!(
                "Write the companion documentation for the {} file `{}`.",
                language, path
            ))
            .outline([
                format!("# {}", path),
                "## Purpose".to_string(),
                "## Main components (classes, functions, constants)".to_string(),
                "## Dependencies and what they are used for".to_string(),
                "## Design decisions".to_string(),
                "## API / Interfaces".to_string(),
                "## Usage examples, when applicable".to_string(),
            ])
            .rules([
                "Describe only what the code below shows",
                "Refer to dependencies by the names used in the file",
                MARKDOWN_ONLY,
            ])
    }

    /// Project-level overview from the per-file results
    pub fn project_overview(project_name: &str) -> PromptBuilder {
        PromptBuilder::new()
            .task(format!(
                "Write the top-level documentation of the project `{}` from the per-file documentation below.",
                project_name
            ))
            .outline([
                format!("# {} - Project Documentation", project_name),
                "## Overview".to_string(),
                "## Architecture".to_string(),
                "## Main modules".to_string(),
                "## Dependency graph".to_string(),
                "## Entry points".to_string(),
                "## File structure".to_string(),
            ])
            .rules([
                "Mention files whose analysis failed as undocumented",
                MARKDOWN_ONLY,
            ])
    }

    /// Short narrative on top of the rendered dependency graph
    pub fn dependency_narrative(project_name: &str) -> PromptBuilder {
        PromptBuilder::new()
            .task(format!(
                "Summarize how the files of `{}` depend on each other.",
                project_name
            ))
            .rules([
                "Name the central modules that many files use",
                "Point out cycles and heavily used external packages",
                "Stay under 300 words and do not repeat the lists",
                MARKDOWN_ONLY,
            ])
    }
}

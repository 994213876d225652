//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Repository scanner constants
pub mod scanner {
    /// Default maximum file size read into memory (1 MiB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

    /// Default maximum directory depth below the root
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Bytes inspected when checking for binary content
    pub const BINARY_PROBE_BYTES: usize = 8192;

    /// Entries pruned regardless of user configuration (name globs)
    pub const BUILTIN_IGNORES: &[&str] = &[
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        "__pycache__",
        ".venv",
        "venv",
        ".pytest_cache",
        ".mypy_cache",
        "target",
        "dist",
        "build",
        ".docusaurus",
        "*.egg-info",
        "*.pyc",
        "*.pyo",
        ".DS_Store",
        "*-docusaurus",
        // Output folders from earlier runs: <name>-docs-<8 hex>
        "*-docs-[0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f]",
    ];
}

/// Documentation orchestrator constants
pub mod orchestrator {
    /// Default worker pool width
    pub const DEFAULT_WORKERS: usize = 3;

    /// Politeness delay between dispatches from one worker (milliseconds)
    pub const DEFAULT_DISPATCH_DELAY_MS: u64 = 1000;

    /// Characters of file content sent to the model per file
    pub const DEFAULT_MAX_FILE_CHARS: usize = 100_000;

    /// Above this many characters the overview is built from excerpts
    pub const DEFAULT_OVERVIEW_BUDGET_CHARS: usize = 60_000;

    /// Per-file excerpt length used in compact overview prompts
    pub const DEFAULT_EXCERPT_CHARS: usize = 500;

    /// Characters of each project context file included in prompts
    pub const PROJECT_CONTEXT_CHARS: usize = 500;

    /// Files read for project context when present at the root
    pub const PROJECT_CONTEXT_FILES: &[&str] = &[
        "README.md",
        "pyproject.toml",
        "package.json",
        "Cargo.toml",
        "requirements.txt",
    ];
}

/// LLM retry constants
pub mod retry {
    /// Attempts per call, first try included
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1000;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// LLM client constants
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "openrouter";
    pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
    pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_API_KEY";
    pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}

/// Output layout constants
pub mod output {
    /// Suffix appended to a source file name for its companion doc
    pub const DOC_SUFFIX: &str = ".md";

    /// Root overview document
    pub const OVERVIEW_FILE: &str = "README.md";

    /// Root dependency document
    pub const DEPENDENCY_FILE: &str = "dependencies.md";

    /// Run manifest written next to the docs
    pub const RUN_MANIFEST_FILE: &str = "manifest.json";

    /// Quick links listed per navigation group in the overview
    pub const MAX_QUICK_LINKS: usize = 5;

    /// Above this many internal edges the Mermaid diagram is omitted
    pub const MAX_MERMAID_EDGES: usize = 200;

    /// Suffix of the generated site directory
    pub const SITE_DIR_SUFFIX: &str = "-docusaurus";
}

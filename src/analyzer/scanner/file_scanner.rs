use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use super::ignore_rules::IgnoreRules;
use crate::analyzer::Language;
use crate::config::ScanConfig;
use crate::constants::scanner::{BINARY_PROBE_BYTES, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FILE_SIZE};
use crate::types::{DocError, FileRecord, Manifest, Result, ScanWarning, SkipReason};

/// Result of one scan: the manifest plus everything that was left out
#[derive(Debug, Default)]
pub struct ScanReport {
    pub manifest: Manifest,
    pub warnings: Vec<ScanWarning>,
    /// Files whose extension maps to no supported language
    pub unsupported: usize,
}

/// Depth-first repository walker with an explicit frontier.
///
/// Ignored directories are pruned before they are opened. Symlinks are
/// skipped unless `follow_symlinks` is set, in which case directories are
/// tracked by canonical path and a revisit is reported as a cycle.
pub struct FileScanner {
    root: PathBuf,
    ignore: Vec<String>,
    respect_gitignore: bool,
    include_hidden: bool,
    follow_symlinks: bool,
    max_file_size: u64,
    max_depth: usize,
    extensions: Option<BTreeSet<String>>,
}

struct Frontier {
    absolute: PathBuf,
    relative: String,
    depth: usize,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignore: Vec::new(),
            respect_gitignore: true,
            include_hidden: false,
            follow_symlinks: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            extensions: None,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &ScanConfig) -> Self {
        Self::new(root)
            .with_ignore(config.ignore.clone())
            .respect_gitignore(config.respect_gitignore)
            .include_hidden(config.include_hidden)
            .follow_symlinks(config.follow_symlinks)
            .with_max_file_size(config.max_file_size)
            .with_max_depth(config.max_depth)
            .with_extensions(config.extensions.clone())
    }

    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = patterns;
        self
    }

    pub fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    pub fn include_hidden(mut self, enabled: bool) -> Self {
        self.include_hidden = enabled;
        self
    }

    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.follow_symlinks = enabled;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Restrict to these extensions; an empty list means every known language
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = if extensions.is_empty() {
            None
        } else {
            Some(
                extensions
                    .into_iter()
                    .map(|e| e.trim_start_matches('.').to_lowercase())
                    .collect(),
            )
        };
        self
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn scan(&self) -> Result<ScanReport> {
        if !self.root.is_dir() {
            return Err(DocError::RepositoryNotFound(self.root.clone()));
        }

        let mut rules = IgnoreRules::new(&self.ignore)?;
        if self.respect_gitignore {
            rules = rules.with_gitignore(&self.root);
        }

        let mut report = ScanReport::default();
        let mut records = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        if self.follow_symlinks {
            visited.insert(fs::canonicalize(&self.root)?);
        }

        let mut stack = vec![Frontier {
            absolute: self.root.clone(),
            relative: String::new(),
            depth: 0,
        }];

        while let Some(dir) = stack.pop() {
            let entries = match fs::read_dir(&dir.absolute) {
                Ok(entries) => entries,
                Err(e) if dir.depth == 0 => return Err(e.into()),
                Err(e) => {
                    self.skip(&mut report, &dir.absolute, unreadable(&e));
                    continue;
                }
            };

            let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
            // Reverse order so the stack pops entries alphabetically
            entries.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

            for entry in entries {
                let name = entry.file_name().to_string_lossy().into_owned();
                let absolute = entry.path();
                let relative = if dir.relative.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", dir.relative, name)
                };

                if name.starts_with('.') && !self.include_hidden {
                    continue;
                }

                let Ok(file_type) = entry.file_type() else {
                    self.skip(
                        &mut report,
                        &absolute,
                        SkipReason::Unreadable {
                            error: "cannot determine file type".to_string(),
                        },
                    );
                    continue;
                };

                let (is_dir, is_file) = if file_type.is_symlink() {
                    if !self.follow_symlinks {
                        self.skip(&mut report, &absolute, SkipReason::Symlink);
                        continue;
                    }
                    match fs::metadata(&absolute) {
                        Ok(meta) => (meta.is_dir(), meta.is_file()),
                        Err(e) => {
                            self.skip(&mut report, &absolute, unreadable(&e));
                            continue;
                        }
                    }
                } else {
                    (file_type.is_dir(), file_type.is_file())
                };

                if rules.is_ignored(&name, &relative, &absolute, is_dir) {
                    debug!(path = %relative, "Pruned by ignore rules");
                    continue;
                }

                if is_dir {
                    let depth = dir.depth + 1;
                    if depth > self.max_depth {
                        self.skip(&mut report, &absolute, SkipReason::DepthLimit { depth });
                        continue;
                    }
                    if self.follow_symlinks {
                        match fs::canonicalize(&absolute) {
                            Ok(canonical) => {
                                if !visited.insert(canonical) {
                                    self.skip(&mut report, &absolute, SkipReason::SymlinkCycle);
                                    continue;
                                }
                            }
                            Err(e) => {
                                self.skip(&mut report, &absolute, unreadable(&e));
                                continue;
                            }
                        }
                    }
                    stack.push(Frontier {
                        absolute,
                        relative,
                        depth,
                    });
                } else if is_file {
                    match self.read_file(&absolute, relative) {
                        FileOutcome::Record(record) => records.push(record),
                        FileOutcome::Unsupported => report.unsupported += 1,
                        FileOutcome::Skipped(reason) => self.skip(&mut report, &absolute, reason),
                    }
                }
            }
        }

        report.manifest = Manifest::new(self.root.clone(), records);
        debug!(
            files = report.manifest.len(),
            skipped = report.warnings.len(),
            unsupported = report.unsupported,
            "Scan complete"
        );
        Ok(report)
    }

    fn read_file(&self, absolute: &Path, relative: String) -> FileOutcome {
        let language = Language::from_path(absolute);
        if !language.is_known() || !self.extension_allowed(absolute) {
            return FileOutcome::Unsupported;
        }

        let size = match fs::metadata(absolute) {
            Ok(meta) => meta.len(),
            Err(e) => return FileOutcome::Skipped(unreadable(&e)),
        };
        if size > self.max_file_size {
            return FileOutcome::Skipped(SkipReason::Oversized {
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = match fs::read(absolute) {
            Ok(bytes) => bytes,
            Err(e) => return FileOutcome::Skipped(unreadable(&e)),
        };
        if bytes[..bytes.len().min(BINARY_PROBE_BYTES)].contains(&0) {
            return FileOutcome::Skipped(SkipReason::Binary);
        }

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };

        FileOutcome::Record(FileRecord {
            relative_path: relative,
            absolute_path: absolute.to_path_buf(),
            language,
            size_bytes: size,
            content,
        })
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        let Some(allowed) = &self.extensions else {
            return true;
        };
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| allowed.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    fn skip(&self, report: &mut ScanReport, path: &Path, reason: SkipReason) {
        let shown = path.strip_prefix(&self.root).unwrap_or(path);
        warn!(path = %shown.display(), reason = %reason, "Skipped");
        report.warnings.push(ScanWarning::new(shown, reason));
    }
}

enum FileOutcome {
    Record(FileRecord),
    Unsupported,
    Skipped(SkipReason),
}

fn unreadable(err: &std::io::Error) -> SkipReason {
    let error = match err.kind() {
        ErrorKind::PermissionDenied => "permission denied".to_string(),
        ErrorKind::NotFound => "removed during scan".to_string(),
        _ => err.to_string(),
    };
    SkipReason::Unreadable { error }
}

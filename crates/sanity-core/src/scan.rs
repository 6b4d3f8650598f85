//! Per-file dispatch: classify, filter rules, load content once, run checks.
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::classify::{classify_prefix, PREFIX_LEN};
use crate::error::{Result, SanityError};
use crate::rules::{CheckInput, RuleInstance};
use crate::types::{CandidateFile, Diagnostic, LoadedFile, ScanStats};

/// Byte access used by the evaluator.
pub trait FileAccess {
    /// At most `len` leading bytes; shorter files yield what they have.
    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>>;
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskAccess;

impl FileAccess for DiskAccess {
    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len);
        File::open(path)?.take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Absolute, lexically cleaned path. Symlinks are not resolved; if the
/// working directory is unavailable the path is only cleaned.
pub fn canonical_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

struct FileOutcome {
    diagnostics: Vec<Diagnostic>,
    loaded: bool,
}

/// Runs an ordered rule list over an ordered file list.
pub struct Evaluator<'a, A = DiskAccess> {
    rules: &'a [RuleInstance],
    access: A,
}

impl<'a> Evaluator<'a, DiskAccess> {
    pub fn new(rules: &'a [RuleInstance]) -> Self {
        Self { rules, access: DiskAccess }
    }
}

impl<'a, A: FileAccess> Evaluator<'a, A> {
    pub fn with_access(rules: &'a [RuleInstance], access: A) -> Self {
        Self { rules, access }
    }

    /// Evaluate every file and write one line per diagnostic to `out`.
    ///
    /// Files are handled in order and each file's diagnostics are written in
    /// rule order before the next file is read. A read failure stops the run.
    pub fn run(&self, files: &[CandidateFile], out: &mut dyn Write) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        for file in files {
            let outcome = self.check_file(file)?;
            stats.files_scanned += 1;
            stats.files_loaded += usize::from(outcome.loaded);
            for diagnostic in &outcome.diagnostics {
                stats.diagnostics += 1;
                writeln!(out, "{diagnostic}")?;
            }
        }
        Ok(stats)
    }

    /// Collect the diagnostics of every file, in output order.
    pub fn evaluate(&self, files: &[CandidateFile]) -> Result<Vec<Diagnostic>> {
        let mut all = Vec::new();
        for file in files {
            all.extend(self.check_file(file)?.diagnostics);
        }
        Ok(all)
    }

    fn check_file(&self, file: &CandidateFile) -> Result<FileOutcome> {
        let path = canonical_path(&file.path);
        let shown = path.to_string_lossy();

        let prefix = self
            .access
            .read_prefix(&path, PREFIX_LEN)
            .map_err(|source| SanityError::FileRead { path: path.clone(), source })?;
        let kind = classify_prefix(&prefix);

        // Loaded on the first rule that applies, dropped with this frame.
        let mut loaded: Option<LoadedFile> = None;
        let mut diagnostics = Vec::new();

        for rule in self.rules {
            let def = &rule.definition;
            if !def.matches_extension(&file.extension) {
                debug!(rule = %def.name, path = %shown, "skip: extension");
                continue;
            }
            if !def.matches_kind(kind) {
                debug!(rule = %def.name, path = %shown, ?kind, "skip: content type");
                continue;
            }

            let content = match loaded {
                Some(ref content) => content,
                None => {
                    let bytes = self
                        .access
                        .read_all(&path)
                        .map_err(|source| SanityError::FileRead { path: path.clone(), source })?;
                    &*loaded.insert(LoadedFile::from_bytes(&bytes))
                }
            };

            let input = CheckInput {
                path: &shown,
                text: &content.text,
                lines: &content.lines,
                argument: rule.argument.as_deref(),
            };
            diagnostics.extend(def.check(&input));
        }

        Ok(FileOutcome { diagnostics, loaded: loaded.is_some() })
    }
}

/// Evaluate `paths` from disk with `rules`, streaming diagnostics to `out`.
pub fn scan_and_write(rules: &[RuleInstance], paths: &[PathBuf], out: &mut dyn Write) -> Result<ScanStats> {
    let files: Vec<CandidateFile> = paths.iter().cloned().map(CandidateFile::new).collect();
    Evaluator::new(rules).run(&files, out)
}

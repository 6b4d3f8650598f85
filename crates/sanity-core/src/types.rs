//! Shared value types passed between the evaluator and the checks.
use std::fmt;
use std::path::{Path, PathBuf};

/// Content type of a candidate file, as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Binary,
}

/// A path selected for evaluation together with its extension (dot included, e.g. `.cs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub extension: String,
}

impl CandidateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self { path, extension }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// File content materialized for the checks.
///
/// `text` keeps the original newline bytes; `lines` has CR, LF and CRLF all
/// normalized away.
#[derive(Debug, Clone, Default)]
pub struct LoadedFile {
    pub text: String,
    pub lines: Vec<String>,
}

impl LoadedFile {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let lines = split_lines(&text);
        Self { text, lines }
    }
}

/// Split on every newline convention. An empty input has no lines; a trailing
/// newline yields a final empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    /// 1-based; `None` for file-level failures.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn file(path: &str, message: impl Into<String>) -> Self {
        Self { path: path.to_owned(), line: None, message: message.into() }
    }

    pub fn at_line(path: &str, line: usize, message: impl Into<String>) -> Self {
        Self { path: path.to_owned(), line: Some(line), message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.path, line, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

/// Run counters, logged by the CLI once evaluation finishes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_loaded: usize,
    pub diagnostics: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_leading_dot() {
        assert_eq!(CandidateFile::new("src/Widget.cs").extension, ".cs");
        assert_eq!(CandidateFile::new("Makefile").extension, "");
    }

    #[test]
    fn split_lines_normalizes_all_newline_styles() {
        assert_eq!(split_lines("a\r\nb\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn loaded_file_keeps_raw_newlines() {
        let f = LoadedFile::from_bytes(b"x\r\ny\n");
        assert_eq!(f.text, "x\r\ny\n");
        assert_eq!(f.lines, vec!["x", "y", ""]);
    }

    #[test]
    fn diagnostic_rendering() {
        assert_eq!(Diagnostic::file("/a/b.txt", "bad").to_string(), "/a/b.txt: bad");
        assert_eq!(Diagnostic::at_line("/a/b.txt", 7, "bad").to_string(), "/a/b.txt:7: bad");
    }
}

//! Where candidate files come from: explicit arguments or a git working tree.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, SanityError};

/// Produces the ordered list of paths to check.
pub trait FileSource {
    fn list_files(&self) -> Result<Vec<PathBuf>>;
}

/// Paths and glob patterns given on the command line.
///
/// Directories expand recursively to their regular files in name order;
/// `.git` directories are pruned and missing paths are skipped.
#[derive(Debug, Clone)]
pub struct ExplicitFiles {
    args: Vec<String>,
}

impl ExplicitFiles {
    pub fn new(args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { args: args.into_iter().map(Into::into).collect() }
    }

    fn expand_globs(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        for arg in &self.args {
            if !arg.contains(['*', '?']) {
                roots.push(PathBuf::from(arg));
                continue;
            }
            match glob::glob(arg) {
                Ok(paths) => roots.extend(paths.flatten()),
                Err(err) => debug!(pattern = %arg, %err, "skip: bad glob pattern"),
            }
        }
        roots
    }
}

impl FileSource for ExplicitFiles {
    fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in self.expand_globs() {
            let walker = WalkDir::new(&root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));
            for entry in walker {
                match entry {
                    Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
                    Ok(_) => {}
                    Err(err) => debug!(root = %root.display(), %err, "skip: unreadable path"),
                }
            }
        }
        Ok(files)
    }
}

/// Staged, unstaged and untracked files of the enclosing git repository.
///
/// Only regular files are returned: git lists untracked nested repositories
/// and changed submodules as directories.
#[derive(Debug, Clone)]
pub struct RepositoryFiles {
    start: PathBuf,
    ceilings: Vec<PathBuf>,
}

/// Environment variable git uses to stop repository discovery.
pub const CEILING_DIRECTORIES_ENV: &str = "GIT_CEILING_DIRECTORIES";

const GIT_LISTINGS: [&[&str]; 3] = [
    &["diff", "--name-only", "-z", "--diff-filter=d", "--cached"],
    &["diff", "--name-only", "-z", "--diff-filter=d"],
    &["ls-files", "-z", "--others", "--exclude-standard"],
];

impl RepositoryFiles {
    /// Search for the repository from `start` upwards.
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self { start: start.into(), ceilings: Vec::new() }
    }

    /// Never look at these directories or above them.
    pub fn with_ceilings(mut self, ceilings: impl IntoIterator<Item = PathBuf>) -> Self {
        self.ceilings = ceilings.into_iter().filter(|p| !p.as_os_str().is_empty()).collect();
        self
    }

    /// Start from the current working directory, honouring `GIT_CEILING_DIRECTORIES`.
    pub fn from_current_dir() -> Result<Self> {
        let ceilings = std::env::var_os(CEILING_DIRECTORIES_ENV)
            .map(|v| std::env::split_paths(&v).collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(Self::new(std::env::current_dir()?).with_ceilings(ceilings))
    }
}

impl FileSource for RepositoryFiles {
    fn list_files(&self) -> Result<Vec<PathBuf>> {
        let root = find_repo_root_below(&self.start, &self.ceilings)?;
        info!(root = %root.display(), "listing changed files");

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for args in GIT_LISTINGS {
            let output = run_git(&root, args)?;
            for entry in output.split('\0').filter(|e| !e.is_empty()) {
                let path = root.join(entry);
                if !path.metadata().is_ok_and(|m| m.is_file()) {
                    debug!(path = %path.display(), "skip: not a regular file");
                    continue;
                }
                if seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}

/// Nearest ancestor of `start` (inclusive) holding a `.git` directory.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    find_repo_root_below(start, &[])
}

/// Like [`find_repo_root`], but the walk stops before reaching any of
/// `ceilings`.
pub fn find_repo_root_below(start: &Path, ceilings: &[PathBuf]) -> Result<PathBuf> {
    start
        .ancestors()
        .take_while(|dir| !ceilings.iter().any(|c| c.as_path() == *dir))
        .find(|dir| dir.join(".git").is_dir())
        .map(Path::to_path_buf)
        .ok_or(SanityError::NotARepository)
}

fn run_git(root: &Path, args: &[&str]) -> Result<String> {
    let command = format!("git {}", args.join(" "));
    debug!(%command, "running");
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .map_err(|err| SanityError::GitCommand { command: command.clone(), output: err.to_string() })?;
    if !output.status.success() {
        return Err(SanityError::GitCommand {
            command,
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

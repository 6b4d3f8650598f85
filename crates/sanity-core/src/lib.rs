//! Advisory style and hygiene checks over a set of files.
//!
//! - `rules`: the rule catalog and resolution of config lines into instances.
//! - `checks`: the built-in checks (whitespace, newlines, indent width, C# naming).
//! - `classify`: text/binary decision from a short prefix.
//! - `scan`: per-file dispatch, lazy content loading, diagnostic output.
//! - `sources`: explicit path/glob expansion and git working-tree listing.
//!
//! Diagnostics never make a run fail; only setup and I/O errors do.

mod checks;
mod classify;
mod config;
mod error;
mod rules;
mod scan;
mod sources;
mod types;

pub use checks::{path_as_namespace, NewlineStyles, RuleKind, KEYWORDS_WITH_SPACED_PARENS};
pub use classify::{classify_prefix, PREFIX_LEN};
pub use config::{load_rules, parse_rules, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use error::{Result, SanityError};
pub use rules::{CheckInput, Predicate, RuleCatalog, RuleDefinition, RuleInstance};
pub use scan::{canonical_path, scan_and_write, DiskAccess, Evaluator, FileAccess};
pub use sources::{
    find_repo_root, find_repo_root_below, ExplicitFiles, FileSource, RepositoryFiles, CEILING_DIRECTORIES_ENV,
};
pub use types::{split_lines, CandidateFile, Diagnostic, FileKind, LoadedFile, ScanStats};

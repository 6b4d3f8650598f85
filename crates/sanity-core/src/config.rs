//! Rule list file: one rule reference per line.
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SanityError};
use crate::rules::{RuleCatalog, RuleInstance};

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "git-sanity-checker.cfg";

/// Environment variable overriding the config location.
pub const CONFIG_PATH_ENV: &str = "GIT_SANITY_CONFIG";

/// Read and resolve the rule list at `path`.
pub fn load_rules(path: &Path, catalog: &RuleCatalog) -> Result<Vec<RuleInstance>> {
    let text = std::fs::read_to_string(path).map_err(|source| SanityError::MissingConfig {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(path, &text, catalog)
}

/// Resolve every effective line of `text`, keeping file order.
///
/// Lines are trimmed of spaces and tabs; blank lines and lines starting with
/// `#` or `//` are skipped. `source` only names the file in errors.
pub fn parse_rules(source: &Path, text: &str, catalog: &RuleCatalog) -> Result<Vec<RuleInstance>> {
    let mut rules = Vec::new();
    for line in text.lines() {
        let line = line.trim_matches(|c| c == ' ' || c == '\t');
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let rule = catalog.resolve(line)?;
        debug!(rule = rule.name(), argument = ?rule.argument, "rule loaded");
        rules.push(rule);
    }

    if rules.is_empty() {
        return Err(SanityError::EmptyConfig(source.to_path_buf()));
    }
    Ok(rules)
}

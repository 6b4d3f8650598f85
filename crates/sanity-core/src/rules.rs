//! Rule catalog and the resolution of config lines into rule instances.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::checks::RuleKind;
use crate::error::{Result, SanityError};
use crate::types::{Diagnostic, FileKind};

/// What a check sees for one file.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// Canonical path, used verbatim in diagnostics.
    pub path: &'a str,
    /// Whole file with original newlines.
    pub text: &'a str,
    pub lines: &'a [String],
    /// Free-form argument from the config line, if any.
    pub argument: Option<&'a str>,
}

/// A pure check over one file's content and path.
pub trait Predicate: Send + Sync {
    fn check(&self, input: &CheckInput<'_>) -> Vec<Diagnostic>;
}

/// A named check plus the filters deciding which files it sees.
#[derive(Clone)]
pub struct RuleDefinition {
    pub name: String,
    pub applies_to_text: bool,
    pub applies_to_binary: bool,
    /// Dot-prefixed extensions; empty means every extension.
    pub extensions: Vec<String>,
    predicate: Arc<dyn Predicate>,
}

impl RuleDefinition {
    /// A text-only rule for every extension.
    pub fn new(name: impl Into<String>, predicate: impl Predicate + 'static) -> Self {
        Self {
            name: name.into(),
            applies_to_text: true,
            applies_to_binary: false,
            extensions: Vec::new(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| (*e).to_owned()).collect();
        self
    }

    pub fn with_kinds(mut self, text: bool, binary: bool) -> Self {
        self.applies_to_text = text;
        self.applies_to_binary = binary;
        self
    }

    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|e| e == extension)
    }

    pub fn matches_kind(&self, kind: FileKind) -> bool {
        match kind {
            FileKind::Text => self.applies_to_text,
            FileKind::Binary => self.applies_to_binary,
        }
    }

    pub fn check(&self, input: &CheckInput<'_>) -> Vec<Diagnostic> {
        self.predicate.check(input)
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("name", &self.name)
            .field("applies_to_text", &self.applies_to_text)
            .field("applies_to_binary", &self.applies_to_binary)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// A catalog entry bound to the argument of one config line.
#[derive(Debug, Clone)]
pub struct RuleInstance {
    pub definition: RuleDefinition,
    pub argument: Option<String>,
}

impl RuleInstance {
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// Immutable name → definition mapping. Lookup is case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: HashMap<String, RuleDefinition>,
}

impl RuleCatalog {
    /// Catalog of every built-in rule.
    pub fn builtin() -> Self {
        Self::from_definitions(RuleKind::ALL.iter().map(|kind| kind.definition()))
    }

    /// Later definitions replace earlier ones with the same name.
    pub fn from_definitions(definitions: impl IntoIterator<Item = RuleDefinition>) -> Self {
        let rules = definitions.into_iter().map(|d| (d.name.clone(), d)).collect();
        Self { rules }
    }

    pub fn get(&self, name: &str) -> Option<&RuleDefinition> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve `<Name>` or `<Name> <argument>`; the argument is everything
    /// after the first space, verbatim.
    pub fn resolve(&self, line: &str) -> Result<RuleInstance> {
        let (name, argument) = match line.split_once(' ') {
            Some((name, rest)) => (name, Some(rest.to_owned())),
            None => (line, None),
        };
        let definition = self
            .get(name)
            .ok_or_else(|| SanityError::UnknownRule(name.to_owned()))?
            .clone();
        Ok(RuleInstance { definition, argument })
    }
}

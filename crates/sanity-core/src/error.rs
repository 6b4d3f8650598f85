use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanityError {
    #[error("Cannot read config file \"{path}\"")]
    MissingConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No rules are loaded from \"{0}\"")]
    EmptyConfig(PathBuf),

    #[error("Unrecognized rule: {0}")]
    UnknownRule(String),

    #[error("Cannot read file \"{path}\"")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot execute command \"{command}\": {output}")]
    GitCommand { command: String, output: String },

    #[error("Not a git repository")]
    NotARepository,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SanityError>;

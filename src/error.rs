//! Error type shared by every tool

use std::path::PathBuf;

/// Errors that end a run
///
/// Malformed rows and duplicate fixes are not errors: they are logged and
/// skipped while reading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config file {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file not found: {0:?}")]
    ConfigMissing(PathBuf),

    #[error("bad row {line}: {reason}")]
    BadRow { line: u64, reason: String },

    #[error("could not parse date: {0:?}")]
    BadDate(String),

    /// Nothing left to cluster, usually after filtering
    #[error("no data: {0}")]
    NoData(String),

    /// The whole pipeline ran and produced nothing
    #[error("nothing found: {0}")]
    NothingFound(String),

    #[error("no {kind} with id {id:?}")]
    UnknownId { kind: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, Error>;

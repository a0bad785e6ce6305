use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised while opening or reading the block-event database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Faults around the persisted config / coordinate state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}; delete it to reset: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory \"{0}\" does not exist")]
    MissingDirectory(PathBuf),

    #[error("no database path configured; run with --change-db")]
    NoDatabasePath,

    #[error("no update URL configured; set \"updateUrl\" in {0}")]
    NoUpdateUrl(PathBuf),
}

#[derive(Debug, Error)]
pub enum TeleportError {
    #[error("--teleport takes 0, 1, 3 or 4 values (got {0})")]
    Arity(usize),

    #[error("coordinate {0} is out of range")]
    CoordinateRange(i64),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("update server returned status {0}")]
    Status(u16),

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

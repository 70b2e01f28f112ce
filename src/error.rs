use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganismError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("replay file {0} contains no snapshots")]
    EmptyReplay(PathBuf),
}

pub type Result<T> = std::result::Result<T, OrganismError>;

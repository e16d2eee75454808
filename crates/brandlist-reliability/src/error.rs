use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReliabilityError {
    #[error("reliability log I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize reliability entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

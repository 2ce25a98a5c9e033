use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed sales data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unrecognised sale date {0:?}")]
    InvalidDate(String),

    #[error("delimited input has no header line")]
    MissingHeader,

    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot encode converted records: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cannot write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

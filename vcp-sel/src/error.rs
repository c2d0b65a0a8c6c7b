//! Error types for vcp-sel
//!
//! Selection transitions never fail; errors only arise while reading
//! source documents or parsing scripted actions.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Source file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file is not valid JSON of the expected shape
    #[error("Malformed source {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Scripted action could not be parsed
    #[error("Invalid action '{0}'")]
    InvalidAction(String),
}

//! Crate error type.
//!
//! Malformed *input* (empty/non-title text) is not an error — see
//! [`crate::normalizer::normalize`], which returns `("", vec![], vec![])` for
//! it, per the engine's error-handling contract. `EngineError` is reserved
//! for construction-time failures: missing gazetteer files, corrupt or
//! version-mismatched artifacts, and malformed embedding tables.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read gazetteer file {path}: {source}")]
    GazetteerIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt artifact at {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error("artifact version mismatch at {path}: expected {expected}, found {found}")]
    ArtifactVersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("malformed embedding table: {0}")]
    MalformedEmbeddings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Error types for the record store.

use std::path::PathBuf;

use lumen_pipeline::ExchangeError;
use uuid::Uuid;

/// Errors from capturing, decoding, or storing edited photos.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The edited image could not be encoded for storage.
    #[error("failed to encode edited photo: {0}")]
    Encode(#[source] ExchangeError),

    /// Stored bytes could not be decoded back into an image.
    #[error("failed to decode stored photo: {0}")]
    Decode(#[source] ExchangeError),

    /// A record with this id is already stored.
    #[error("a record with id {0} already exists")]
    DuplicateId(Uuid),

    /// No record with this id is stored.
    #[error("no record with id {0}")]
    NotFound(Uuid),

    /// A [`StoreConfig`](crate::StoreConfig) field is out of range.
    #[error("invalid store config: {0}")]
    InvalidConfig(String),

    /// Reading or writing a gallery file failed.
    #[error("gallery I/O failed at {}: {source}", .path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The gallery index could not be parsed or serialized.
    #[error("gallery index {} is invalid: {source}", .path.display())]
    Index {
        /// Path of the index file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The gallery index was written by an incompatible version.
    #[error("unsupported gallery index version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version recorded in the index.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },
}

//! Handoff Errors

use std::io;

use thiserror::Error;

/// Errors reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("handoff store i/o failed for {key}: {source}")]
    Io {
        /// Key being accessed
        key: String,

        /// Underlying error
        source: io::Error,
    },

    /// The key contains characters the store cannot persist.
    #[error("invalid handoff key {0}")]
    InvalidKey(String),
}

/// Errors freezing or restoring a checkout snapshot.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored value could not be encoded or decoded.
    #[error("handoff value for {key} is malformed: {source}")]
    Malformed {
        /// Key holding the value
        key: &'static str,

        /// Decoder error
        source: serde_json::Error,
    },
}

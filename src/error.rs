use std::path::PathBuf;

use thiserror::Error;

/// Central error type for the audio-stem crate.
///
/// Every failure in the pipeline surfaces as one of these variants; nothing
/// in the crate terminates the process.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing or malformed. Raised before any side
    /// effect is performed.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The source file could not be decoded, or decoded to a sample rate or
    /// channel count the pipeline does not accept.
    #[error("unsupported audio format in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    /// The model weight file is missing, truncated, or not a weight file.
    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// The inference engine failed, or returned a tensor violating its
    /// contract. Never retried.
    #[error("inference failed: {0}")]
    Inference(#[source] anyhow::Error),

    /// An output target index with no entry in the stem name table. Aborts
    /// the remaining writes.
    #[error("target {index} is not a known stem")]
    UnsupportedTarget { index: usize },

    /// A stem file could not be encoded.
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Client-side building blocks for chunked uploads.
//!
//! Splits an [`UploadSubject`] into a [`ChunkPlan`], tracks which chunks the
//! store acknowledged, derives the dedup [`Fingerprint`], and reports
//! progress through a caller-supplied callback.

mod chunked;
mod fingerprint;
mod progress;
mod subject;
mod types;
mod validation;

pub use chunked::{ChunkPlan, ChunkRange};
pub use fingerprint::{Fingerprint, derive_fingerprint};
pub use progress::{ProgressCallback, ProgressReporter};
pub use subject::{FileSubject, MemorySubject, UploadSubject};
pub use types::AcknowledgedSet;
pub use validation::validate_folder_name;

/// Default chunk size: 5 MiB, shared with the file store.
pub const DEFAULT_CHUNK_SIZE: u64 = searchhub_protocol::constants::CHUNK_SIZE;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk {index} is outside the plan of {planned} chunks")]
    ChunkOutOfRange { index: usize, planned: usize },

    #[error("byte range {start}..{end} exceeds subject size {size}")]
    RangeOutOfBounds { start: u64, end: u64, size: u64 },

    #[error("invalid folder: {0}")]
    InvalidFolder(String),
}

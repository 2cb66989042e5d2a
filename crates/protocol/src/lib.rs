//! Wire types for the SearchHub file store.
//!
//! The file store speaks plain JSON over HTTP. Each operation has a request
//! payload and a loosely-shaped response; [`types`] folds every response into
//! a tagged [`Reply`] so callers never inspect raw `success` flags.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    CheckRequest, CheckResponse, ChunkResponse, CompleteUploadRequest, CompleteUploadResponse,
    IndexAddResponse, IndexInfo, InitUploadRequest, InitUploadResponse, ProgressResponse,
};
pub use types::{Completed, PostProcessing, RemoteProgress, Reply};

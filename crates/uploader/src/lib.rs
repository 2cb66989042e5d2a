//! Resumable, deduplicating chunked uploads to the SearchHub file store.
//!
//! This crate implements the **client-side orchestration** only. Storage,
//! chunk reassembly and indexing live on the server and are reached through
//! the [`RemoteStore`] trait; [`HttpStore`] is the production implementation.
//!
//! # Pipeline
//!
//! 1. **Fingerprint**: hash a bounded prefix of the file
//! 2. **Check**: ask the store whether it already has the content
//! 3. **Init**: open an upload session
//! 4. **Upload**: send chunks in sequential batches of concurrent requests
//! 5. **Complete**: finalize, then register in the search index if asked

pub mod controller;
pub mod error;
pub mod finalizer;
pub mod http;
pub mod negotiator;
pub mod store;
pub mod transmitter;
pub mod types;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use controller::{PHASE_INSTANT, PHASE_UPLOADING, UploadController, UploadHandle};
pub use error::UploadError;
pub use finalizer::{CompletionFinalizer, FinalizeOutcome};
pub use http::HttpStore;
pub use negotiator::{SessionHandle, SessionNegotiator};
pub use store::{RemoteStore, StoreFuture};
pub use transmitter::ChunkTransmitter;
pub use types::{ResumeMode, UploadOptions, UploadOutcome, UploadState};

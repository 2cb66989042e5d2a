//! Remote file-store abstraction.
//!
//! `RemoteStore` is implemented by [`HttpStore`](crate::HttpStore) for the
//! real server. Keeping the transport behind a trait lets the upload logic
//! be tested with mocks.

use std::future::Future;
use std::pin::Pin;

use searchhub_protocol::{
    CheckRequest, CheckResponse, ChunkResponse, CompleteUploadRequest, CompleteUploadResponse,
    IndexAddResponse, InitUploadRequest, InitUploadResponse, ProgressResponse,
};

use crate::error::UploadError;

/// Boxed future returned by every [`RemoteStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UploadError>> + Send + 'a>>;

/// Abstract connection to the file store.
///
/// An `Err` means the request never produced a reply (transport failure,
/// non-2xx status, undecodable body). A reply with `success: false` is
/// returned as `Ok` and interpreted by the caller.
pub trait RemoteStore: Send + Sync {
    /// Asks whether content with this fingerprint is already stored.
    fn check(&self, req: &CheckRequest) -> StoreFuture<'_, CheckResponse>;

    /// Opens an upload session.
    fn init_upload(&self, req: &InitUploadRequest) -> StoreFuture<'_, InitUploadResponse>;

    /// Sends the raw bytes of one chunk.
    fn upload_chunk(
        &self,
        upload_id: &str,
        chunk_index: usize,
        data: Vec<u8>,
    ) -> StoreFuture<'_, ChunkResponse>;

    /// Merges the session's chunks into the final file.
    fn complete_upload(
        &self,
        req: &CompleteUploadRequest,
    ) -> StoreFuture<'_, CompleteUploadResponse>;

    /// Registers a document with the search index.
    fn add_to_index(&self, document: &serde_json::Value) -> StoreFuture<'_, IndexAddResponse>;

    /// Reads the server-side progress of a session.
    fn upload_progress(&self, upload_id: &str) -> StoreFuture<'_, ProgressResponse>;
}

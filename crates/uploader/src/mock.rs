//! Recording [`RemoteStore`] double shared by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use searchhub_protocol::{
    CheckRequest, CheckResponse, ChunkResponse, CompleteUploadRequest, CompleteUploadResponse,
    IndexAddResponse, InitUploadRequest, InitUploadResponse, ProgressResponse,
};

use crate::error::UploadError;
use crate::store::{RemoteStore, StoreFuture};

type ChunkHook = Box<dyn Fn(usize) + Send + Sync>;

/// Mock store that records every call.
///
/// Defaults: content does not exist, sessions open as `upload-1`,
/// `upload-2`, ..., every chunk is accepted, finalize succeeds without
/// post-processing, progress queries report an unknown session.
pub(crate) struct MockStore {
    check_response: Mutex<CheckResponse>,
    check_transport_error: AtomicBool,
    init_response: Mutex<Option<InitUploadResponse>>,
    rejected_chunks: Mutex<HashSet<usize>>,
    dropped_chunks: Mutex<HashSet<usize>>,
    complete_response: Mutex<CompleteUploadResponse>,
    index_response: Mutex<IndexAddResponse>,
    index_transport_error: AtomicBool,
    progress_response: Mutex<ProgressResponse>,
    chunk_hook: Mutex<Option<ChunkHook>>,

    sessions_opened: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,

    checks: Mutex<Vec<String>>,
    inits: Mutex<Vec<InitUploadRequest>>,
    chunks: Mutex<Vec<(String, usize, Vec<u8>)>>,
    completes: Mutex<Vec<CompleteUploadRequest>>,
    index_docs: Mutex<Vec<serde_json::Value>>,
    events: Mutex<Vec<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            check_response: Mutex::new(CheckResponse::default()),
            check_transport_error: AtomicBool::new(false),
            init_response: Mutex::new(None),
            rejected_chunks: Mutex::new(HashSet::new()),
            dropped_chunks: Mutex::new(HashSet::new()),
            complete_response: Mutex::new(CompleteUploadResponse {
                success: true,
                file_path: Some("uploads/file".into()),
                message: Some("File uploaded successfully".into()),
                ..Default::default()
            }),
            index_response: Mutex::new(IndexAddResponse {
                success: true,
                error: None,
            }),
            index_transport_error: AtomicBool::new(false),
            progress_response: Mutex::new(ProgressResponse {
                success: false,
                error: Some("Upload session not found".into()),
                ..Default::default()
            }),
            chunk_hook: Mutex::new(None),
            sessions_opened: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            checks: Mutex::new(Vec::new()),
            inits: Mutex::new(Vec::new()),
            chunks: Mutex::new(Vec::new()),
            completes: Mutex::new(Vec::new()),
            index_docs: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    // -- configuration --

    pub fn set_exists(&self, exists: bool) {
        self.check_response.lock().unwrap().exists = exists;
    }

    pub fn set_check_response(&self, resp: CheckResponse) {
        *self.check_response.lock().unwrap() = resp;
    }

    pub fn fail_check_transport(&self) {
        self.check_transport_error.store(true, Ordering::SeqCst);
    }

    pub fn set_init_response(&self, resp: InitUploadResponse) {
        *self.init_response.lock().unwrap() = Some(resp);
    }

    /// The store answers `success: false` for this chunk.
    pub fn reject_chunk(&self, index: usize) {
        self.rejected_chunks.lock().unwrap().insert(index);
    }

    /// The request for this chunk fails without a reply.
    pub fn drop_chunk(&self, index: usize) {
        self.dropped_chunks.lock().unwrap().insert(index);
    }

    pub fn set_complete_response(&self, resp: CompleteUploadResponse) {
        *self.complete_response.lock().unwrap() = resp;
    }

    pub fn set_index_response(&self, resp: IndexAddResponse) {
        *self.index_response.lock().unwrap() = resp;
    }

    pub fn fail_index_transport(&self) {
        self.index_transport_error.store(true, Ordering::SeqCst);
    }

    pub fn set_progress_response(&self, resp: ProgressResponse) {
        *self.progress_response.lock().unwrap() = resp;
    }

    /// Runs `hook` with the chunk index while the chunk is in flight.
    pub fn on_chunk(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.chunk_hook.lock().unwrap() = Some(Box::new(hook));
    }

    // -- inspection --

    pub fn checked_hashes(&self) -> Vec<String> {
        self.checks.lock().unwrap().clone()
    }

    pub fn init_requests(&self) -> Vec<InitUploadRequest> {
        self.inits.lock().unwrap().clone()
    }

    pub fn sent_chunks(&self) -> Vec<(String, usize, Vec<u8>)> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn sent_indices(&self) -> Vec<usize> {
        self.chunks.lock().unwrap().iter().map(|c| c.1).collect()
    }

    pub fn complete_requests(&self) -> Vec<CompleteUploadRequest> {
        self.completes.lock().unwrap().clone()
    }

    pub fn indexed_documents(&self) -> Vec<serde_json::Value> {
        self.index_docs.lock().unwrap().clone()
    }

    /// Ordered log of calls: `check`, `init`, `chunk-start:N`, `chunk-end:N`,
    /// `complete`, `index`.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl RemoteStore for MockStore {
    fn check(&self, req: &CheckRequest) -> StoreFuture<'_, CheckResponse> {
        self.log("check");
        self.checks.lock().unwrap().push(req.hash.clone());
        Box::pin(async move {
            if self.check_transport_error.load(Ordering::SeqCst) {
                return Err(UploadError::Http("connection refused".into()));
            }
            Ok(self.check_response.lock().unwrap().clone())
        })
    }

    fn init_upload(&self, req: &InitUploadRequest) -> StoreFuture<'_, InitUploadResponse> {
        self.log("init");
        self.inits.lock().unwrap().push(req.clone());
        Box::pin(async move {
            if let Some(resp) = self.init_response.lock().unwrap().clone() {
                return Ok(resp);
            }
            let n = self.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(InitUploadResponse {
                success: true,
                upload_id: Some(format!("upload-{n}")),
                ..Default::default()
            })
        })
    }

    fn upload_chunk(
        &self,
        upload_id: &str,
        chunk_index: usize,
        data: Vec<u8>,
    ) -> StoreFuture<'_, ChunkResponse> {
        let upload_id = upload_id.to_string();
        Box::pin(async move {
            self.log(format!("chunk-start:{chunk_index}"));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(hook) = self.chunk_hook.lock().unwrap().as_ref() {
                hook(chunk_index);
            }
            // Let the other sends of the batch start before this one settles.
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }

            self.chunks
                .lock()
                .unwrap()
                .push((upload_id, chunk_index, data));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.log(format!("chunk-end:{chunk_index}"));

            if self.dropped_chunks.lock().unwrap().contains(&chunk_index) {
                return Err(UploadError::Http("connection reset".into()));
            }
            if self.rejected_chunks.lock().unwrap().contains(&chunk_index) {
                return Ok(ChunkResponse {
                    success: false,
                    error: Some("Failed to save chunk".into()),
                    ..Default::default()
                });
            }
            Ok(ChunkResponse {
                success: true,
                chunk_index: Some(chunk_index as u32),
                ..Default::default()
            })
        })
    }

    fn complete_upload(
        &self,
        req: &CompleteUploadRequest,
    ) -> StoreFuture<'_, CompleteUploadResponse> {
        self.log("complete");
        self.completes.lock().unwrap().push(req.clone());
        Box::pin(async move { Ok(self.complete_response.lock().unwrap().clone()) })
    }

    fn add_to_index(&self, document: &serde_json::Value) -> StoreFuture<'_, IndexAddResponse> {
        self.log("index");
        self.index_docs.lock().unwrap().push(document.clone());
        Box::pin(async move {
            if self.index_transport_error.load(Ordering::SeqCst) {
                return Err(UploadError::Http("search service unavailable".into()));
            }
            Ok(self.index_response.lock().unwrap().clone())
        })
    }

    fn upload_progress(&self, _upload_id: &str) -> StoreFuture<'_, ProgressResponse> {
        Box::pin(async move {
            self.log("progress");
            Ok(self.progress_response.lock().unwrap().clone())
        })
    }
}

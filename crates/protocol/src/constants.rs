/// Size of one upload chunk (5 MiB).
///
/// Shared with the file store a priori; the server reassembles chunk `i`
/// at byte offset `i * CHUNK_SIZE`, so both sides must agree on it.
pub const CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Number of chunk requests dispatched together in one batch.
pub const MAX_CONCURRENT_CHUNKS: usize = 3;

/// Bytes of file content sampled when deriving a fingerprint (1 MiB).
pub const FINGERPRINT_SAMPLE_SIZE: u64 = 1024 * 1024;

/// Existence check ("instant upload").
pub const PATH_CHECK: &str = "/api/file/check";

/// Opens an upload session.
pub const PATH_INIT: &str = "/api/file/init";

/// Receives one chunk; `upload_id` and `chunk_index` go in the query string.
pub const PATH_CHUNK: &str = "/api/file/chunk";

/// Merges chunks and runs optional post-processing.
pub const PATH_COMPLETE: &str = "/api/file/complete";

/// Server-side view of an upload session.
pub const PATH_PROGRESS: &str = "/api/file/progress";

/// External search-index registration.
pub const PATH_INDEX_ADD: &str = "/api/search/index/add";

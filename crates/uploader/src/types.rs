//! Data types for the upload flow.

use searchhub_protocol::constants::MAX_CONCURRENT_CHUNKS;
use searchhub_transfer::{DEFAULT_CHUNK_SIZE, Fingerprint};
use serde::{Deserialize, Serialize};

/// Lifecycle of one upload controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Fingerprinting,
    CheckingExistence,
    /// The store already had the content; nothing was sent.
    ShortCircuited,
    Initializing,
    Uploading,
    Paused,
    Completing,
    Done,
    Failed,
    Cancelled,
}

/// What `resume()` does after a pause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    /// Re-run the whole pipeline: fingerprint, existence check, new session,
    /// every chunk from the start.
    #[default]
    Restart,
    /// Keep the open session and send only chunks not yet acknowledged.
    ContinueSession,
}

/// Per-upload options.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    /// Destination folder under the store root (`None` = root).
    pub folder: Option<String>,
    /// Ask the store to register the file in the search index.
    pub add_to_index: bool,
    /// Chunk size; must match the store's constant.
    pub chunk_size: u64,
    /// Number of chunks dispatched together per batch.
    pub concurrency: usize,
    pub resume_mode: ResumeMode,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            folder: None,
            add_to_index: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: MAX_CONCURRENT_CHUNKS,
            resume_mode: ResumeMode::default(),
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub fingerprint: Fingerprint,
    /// `true` if the store already had the content ("instant upload").
    pub instant: bool,
    /// Session used for the transfer (`None` for instant uploads).
    pub upload_id: Option<String>,
    pub message: String,
    /// Where the store placed the file.
    pub file_path: Option<String>,
    /// Search-index registration result; `None` when not attempted.
    ///
    /// `Some(false)` does not make the upload itself a failure.
    pub indexed: Option<bool>,
    /// Output of a store-side parse, when one ran.
    pub parse_output: Option<String>,
    pub multimodal_indexed: Option<bool>,
}

impl UploadOutcome {
    pub(crate) fn instant(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            instant: true,
            upload_id: None,
            message: "file already exists, instant upload".into(),
            file_path: None,
            indexed: None,
            parse_output: None,
            multimodal_indexed: None,
        }
    }
}

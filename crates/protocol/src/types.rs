use serde::{Deserialize, Serialize};

use crate::messages::{
    CheckResponse, ChunkResponse, CompleteUploadResponse, IndexAddResponse, InitUploadResponse,
    ProgressResponse,
};

/// Outcome of one file-store operation.
///
/// The store signals failure with `success: false` and an `error` string;
/// every response type folds into this shape via `into_reply`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure(String),
}

impl<T> Reply<T> {
    /// Converts into a `Result`, keeping the server's message as the error.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Success(v) => Ok(v),
            Reply::Failure(msg) => Err(msg),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }
}

fn failure_message(error: Option<String>, message: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.is_empty())
        .or(message.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Post-processing the store performed (or delegated) after merging chunks.
#[derive(Debug, Clone, PartialEq)]
pub enum PostProcessing {
    /// The store parsed structured content itself; `status == 0` means success.
    ServerParsed { status: i32, output: String },
    /// The store tried to parse the file and could not run its parser.
    ParseFailed(String),
    /// The client must forward this document to the search-index endpoint.
    IndexPayload(serde_json::Value),
    /// Nothing to do.
    Nothing,
}

/// Successful finalize reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub file_path: Option<String>,
    pub message: Option<String>,
    pub post_processing: PostProcessing,
    pub multimodal_indexed: Option<bool>,
}

/// Server-side view of an upload session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteProgress {
    pub uploaded_chunks: u32,
    pub total_chunks: u32,
    pub uploaded_size: u64,
    pub total_size: u64,
    pub completed: bool,
}

impl RemoteProgress {
    /// Returns the acknowledged share as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        self.uploaded_chunks as f64 / self.total_chunks as f64 * 100.0
    }
}

impl CheckResponse {
    /// `Success(true)` means the store already holds the content.
    pub fn into_reply(self) -> Reply<bool> {
        match self.error {
            Some(err) => Reply::Failure(err),
            None => Reply::Success(self.exists),
        }
    }
}

impl InitUploadResponse {
    /// Yields the new session id.
    pub fn into_reply(self) -> Reply<String> {
        match self.upload_id {
            Some(id) if self.success && !id.is_empty() => Reply::Success(id),
            _ => Reply::Failure(failure_message(
                self.error,
                self.message,
                "upload session was not initialized",
            )),
        }
    }
}

impl ChunkResponse {
    pub fn into_reply(self) -> Reply<()> {
        if self.success {
            Reply::Success(())
        } else {
            Reply::Failure(failure_message(self.error, self.message, "chunk rejected"))
        }
    }
}

impl CompleteUploadResponse {
    /// Classifies the post-processing signal carried by this reply.
    ///
    /// A store-side parse takes precedence over an index payload.
    pub fn post_processing(&self) -> PostProcessing {
        if self.xml_parsed == Some(true) {
            return PostProcessing::ServerParsed {
                status: self.parse_status.unwrap_or(-1),
                output: self.parse_output.clone().unwrap_or_default(),
            };
        }
        if self.xml_parsed == Some(false)
            && let Some(error) = self.error.as_ref().filter(|e| !e.is_empty())
        {
            return PostProcessing::ParseFailed(error.clone());
        }
        match &self.index_data {
            Some(payload) if !payload.is_null() => PostProcessing::IndexPayload(payload.clone()),
            _ => PostProcessing::Nothing,
        }
    }

    pub fn into_reply(self) -> Reply<Completed> {
        if !self.success {
            return Reply::Failure(failure_message(
                self.error,
                self.message,
                "upload completion failed",
            ));
        }
        let post_processing = self.post_processing();
        Reply::Success(Completed {
            file_path: self.file_path,
            message: self.message,
            post_processing,
            multimodal_indexed: self.multimodal_indexed,
        })
    }
}

impl IndexAddResponse {
    pub fn into_reply(self) -> Reply<()> {
        if self.success {
            Reply::Success(())
        } else {
            Reply::Failure(failure_message(self.error, None, "index registration failed"))
        }
    }
}

impl ProgressResponse {
    pub fn into_reply(self) -> Reply<RemoteProgress> {
        if !self.success {
            return Reply::Failure(failure_message(self.error, None, "upload session not found"));
        }
        Reply::Success(RemoteProgress {
            uploaded_chunks: self.uploaded_chunks,
            total_chunks: self.total_chunks,
            uploaded_size: self.uploaded_size,
            total_size: self.total_size,
            completed: self.completed,
        })
    }
}

//! Existence check and session opening.

use searchhub_protocol::{CheckRequest, InitUploadRequest, RemoteProgress};
use searchhub_transfer::{ChunkPlan, Fingerprint, UploadSubject};
use tracing::debug;

use crate::error::UploadError;
use crate::store::RemoteStore;

/// An open upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub upload_id: String,
    /// Chunk count declared when the session was opened.
    pub total_chunks: usize,
}

/// Talks to the store before any chunk is sent.
///
/// Every failure, transport or server-declared, is reported as
/// [`UploadError::Negotiation`] and never retried.
pub struct SessionNegotiator<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> SessionNegotiator<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// Returns `true` if the store already holds content with `fingerprint`.
    pub async fn check_exists(&self, fingerprint: &Fingerprint) -> Result<bool, UploadError> {
        let req = CheckRequest {
            hash: fingerprint.to_string(),
        };
        let resp = self
            .store
            .check(&req)
            .await
            .map_err(|e| UploadError::Negotiation(format!("existence check: {e}")))?;

        let exists = resp
            .into_reply()
            .into_result()
            .map_err(UploadError::Negotiation)?;
        debug!(%fingerprint, exists, "existence check answered");
        Ok(exists)
    }

    /// Opens a session for `subject` declaring `plan.len()` chunks.
    pub async fn open(
        &self,
        subject: &dyn UploadSubject,
        fingerprint: &Fingerprint,
        plan: &ChunkPlan,
        folder: Option<&str>,
    ) -> Result<SessionHandle, UploadError> {
        let total_chunks = u32::try_from(plan.len()).map_err(|_| {
            UploadError::Negotiation(format!("too many chunks: {}", plan.len()))
        })?;

        let req = InitUploadRequest {
            filename: subject.name().to_string(),
            hash: fingerprint.to_string(),
            total_size: subject.size(),
            total_chunks,
            folder: folder.map(str::to_string),
        };
        let resp = self
            .store
            .init_upload(&req)
            .await
            .map_err(|e| UploadError::Negotiation(format!("session open: {e}")))?;

        let upload_id = resp
            .into_reply()
            .into_result()
            .map_err(UploadError::Negotiation)?;
        debug!(file = subject.name(), %upload_id, total_chunks, "session opened");

        Ok(SessionHandle {
            upload_id,
            total_chunks: plan.len(),
        })
    }

    /// Reads the store's view of an open session.
    pub async fn query_progress(&self, upload_id: &str) -> Result<RemoteProgress, UploadError> {
        let resp = self
            .store
            .upload_progress(upload_id)
            .await
            .map_err(|e| UploadError::Negotiation(format!("progress query: {e}")))?;
        resp.into_reply()
            .into_result()
            .map_err(UploadError::Negotiation)
    }
}

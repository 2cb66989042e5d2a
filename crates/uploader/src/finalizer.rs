//! Session finalization and search-index handoff.

use searchhub_protocol::{CompleteUploadRequest, PostProcessing};
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::negotiator::SessionHandle;
use crate::store::RemoteStore;

/// Result of a successful finalize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizeOutcome {
    pub message: String,
    pub file_path: Option<String>,
    /// `None` when indexing was not requested or the store had nothing to do.
    pub indexed: Option<bool>,
    pub parse_output: Option<String>,
    pub multimodal_indexed: Option<bool>,
}

pub struct CompletionFinalizer<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> CompletionFinalizer<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// Asks the store to merge the session's chunks.
    ///
    /// A failed merge is [`UploadError::Finalize`] with the server's text.
    /// When `wants_indexing` is set, the reply's post-processing signal is
    /// followed; a failing index registration only yields
    /// `indexed: Some(false)`.
    pub async fn finalize(
        &self,
        session: &SessionHandle,
        wants_indexing: bool,
    ) -> Result<FinalizeOutcome, UploadError> {
        let req = CompleteUploadRequest {
            upload_id: session.upload_id.clone(),
            add_to_index: wants_indexing,
        };
        let resp = self
            .store
            .complete_upload(&req)
            .await
            .map_err(|e| UploadError::Finalize(e.to_string()))?;

        let completed = resp
            .into_reply()
            .into_result()
            .map_err(UploadError::Finalize)?;

        let mut outcome = FinalizeOutcome {
            message: completed
                .message
                .unwrap_or_else(|| "upload completed".to_string()),
            file_path: completed.file_path,
            indexed: None,
            parse_output: None,
            multimodal_indexed: completed.multimodal_indexed,
        };

        if !wants_indexing {
            return Ok(outcome);
        }

        match completed.post_processing {
            PostProcessing::ServerParsed { status, output } => {
                debug!(upload_id = %session.upload_id, status, "store parsed the file");
                outcome.indexed = Some(status == 0);
                outcome.parse_output = Some(output);
            }
            PostProcessing::ParseFailed(reason) => {
                warn!(upload_id = %session.upload_id, error = %reason, "store could not parse the file");
                outcome.indexed = Some(false);
            }
            PostProcessing::IndexPayload(document) => {
                outcome.indexed = Some(self.register(&session.upload_id, &document).await);
            }
            PostProcessing::Nothing => {}
        }

        Ok(outcome)
    }

    async fn register(&self, upload_id: &str, document: &serde_json::Value) -> bool {
        match self.store.add_to_index(document).await {
            Ok(resp) => match resp.into_reply().into_result() {
                Ok(()) => {
                    info!(%upload_id, "registered in search index");
                    true
                }
                Err(e) => {
                    warn!(%upload_id, error = %e, "search index rejected document");
                    false
                }
            },
            Err(e) => {
                warn!(%upload_id, error = %e, "search index registration failed");
                false
            }
        }
    }
}

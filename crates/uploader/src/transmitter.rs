use searchhub_transfer::{ChunkRange, UploadSubject};
use tracing::trace;

use crate::error::UploadError;
use crate::negotiator::SessionHandle;
use crate::store::RemoteStore;

/// Sends single chunks. Stateless and never retries.
pub struct ChunkTransmitter<'a> {
    store: &'a dyn RemoteStore,
    subject: &'a dyn UploadSubject,
}

impl<'a> ChunkTransmitter<'a> {
    pub fn new(store: &'a dyn RemoteStore, subject: &'a dyn UploadSubject) -> Self {
        Self { store, subject }
    }

    /// Reads `chunk` from the subject and sends it under `session`.
    ///
    /// Returns the acknowledged index. Any failure, including a local read
    /// error, is a [`UploadError::Transmission`] naming the index.
    pub async fn send(
        &self,
        session: &SessionHandle,
        chunk: ChunkRange,
    ) -> Result<usize, UploadError> {
        let index = chunk.index;
        let failed = |reason: String| UploadError::Transmission { index, reason };

        let data = self
            .subject
            .read_range(chunk.start..chunk.end)
            .await
            .map_err(|e| failed(e.to_string()))?;

        trace!(upload_id = %session.upload_id, chunk = index, bytes = data.len(), "sending chunk");
        let resp = self
            .store
            .upload_chunk(&session.upload_id, index, data)
            .await
            .map_err(|e| failed(e.to_string()))?;

        resp.into_reply().into_result().map_err(failed)?;
        Ok(index)
    }
}

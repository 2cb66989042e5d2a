//! HTTP implementation of [`RemoteStore`].

use std::time::Duration;

use searchhub_protocol::constants::{
    PATH_CHECK, PATH_CHUNK, PATH_COMPLETE, PATH_INDEX_ADD, PATH_INIT, PATH_PROGRESS,
};
use searchhub_protocol::{
    CheckRequest, CheckResponse, ChunkResponse, CompleteUploadRequest, CompleteUploadResponse,
    IndexAddResponse, InitUploadRequest, InitUploadResponse, ProgressResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::UploadError;
use crate::store::{RemoteStore, StoreFuture};

/// File store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// Wraps an existing client. `base_url` is the server root, e.g.
    /// `http://127.0.0.1:8080`.
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// Builds a client with an optional per-request timeout.
    ///
    /// `None` means requests wait indefinitely.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, UploadError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        trace!(%url, "POST");
        let response = self.http_client.post(&url).json(body).send().await?;
        decode(&url, response).await
    }
}

async fn decode<R: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<R, UploadError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UploadError::Http(format!("{url} returned status {status}")));
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl RemoteStore for HttpStore {
    fn check(&self, req: &CheckRequest) -> StoreFuture<'_, CheckResponse> {
        let req = req.clone();
        Box::pin(async move { self.post_json(PATH_CHECK, &req).await })
    }

    fn init_upload(&self, req: &InitUploadRequest) -> StoreFuture<'_, InitUploadResponse> {
        let req = req.clone();
        Box::pin(async move { self.post_json(PATH_INIT, &req).await })
    }

    fn upload_chunk(
        &self,
        upload_id: &str,
        chunk_index: usize,
        data: Vec<u8>,
    ) -> StoreFuture<'_, ChunkResponse> {
        let upload_id = upload_id.to_string();
        let index = chunk_index.to_string();
        Box::pin(async move {
            let url = self.url(PATH_CHUNK);
            trace!(%url, chunk_index, bytes = data.len(), "POST chunk");
            let response = self
                .http_client
                .post(&url)
                .query(&[
                    ("upload_id", upload_id.as_str()),
                    ("chunk_index", index.as_str()),
                ])
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(data)
                .send()
                .await?;
            decode(&url, response).await
        })
    }

    fn complete_upload(
        &self,
        req: &CompleteUploadRequest,
    ) -> StoreFuture<'_, CompleteUploadResponse> {
        let req = req.clone();
        Box::pin(async move { self.post_json(PATH_COMPLETE, &req).await })
    }

    fn add_to_index(&self, document: &serde_json::Value) -> StoreFuture<'_, IndexAddResponse> {
        let document = document.clone();
        Box::pin(async move { self.post_json(PATH_INDEX_ADD, &document).await })
    }

    fn upload_progress(&self, upload_id: &str) -> StoreFuture<'_, ProgressResponse> {
        let upload_id = upload_id.to_string();
        Box::pin(async move {
            let url = self.url(PATH_PROGRESS);
            trace!(%url, %upload_id, "GET progress");
            let response = self
                .http_client
                .get(&url)
                .query(&[("upload_id", upload_id.as_str())])
                .send()
                .await?;
            decode(&url, response).await
        })
    }
}

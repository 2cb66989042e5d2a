use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Asks whether content with this fingerprint is already stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub hash: String,
}

/// Opens a new upload session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitUploadRequest {
    pub filename: String,
    pub hash: String,
    pub total_size: u64,
    pub total_chunks: u32,
    /// Destination folder under the store root (omitted for the root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Finalizes an upload session once every chunk is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteUploadRequest {
    pub upload_id: String,
    #[serde(default)]
    pub add_to_index: bool,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Reply to [`CheckRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to [`InitUploadRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to a raw chunk upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metadata the store reports about a file it is about to index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub file_type: String,
}

/// Reply to [`CompleteUploadRequest`].
///
/// Post-processing fields are only present when indexing was requested:
/// either the store parsed the file itself (`xml_parsed` + `parse_status`)
/// or it hands back an `index_data` document for the client to register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_info: Option<IndexInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_parsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_status: Option<i32>,
    /// Opaque document for the search index. `null` when the store
    /// already indexed the content itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal_indexed: Option<bool>,
}

/// Reply from the search-index registration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexAddResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Server-side progress of an upload session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub uploaded_size: u64,
    #[serde(default)]
    pub total_size: u64,
    /// `null` for an empty file (the store divides by zero).
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub uploaded_chunks: u32,
    #[serde(default)]
    pub total_chunks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_request_omits_root_folder() {
        let req = InitUploadRequest {
            filename: "report.pdf".into(),
            hash: "abc_12".into(),
            total_size: 12,
            total_chunks: 1,
            folder: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("folder"));
        assert!(json.contains("\"total_chunks\":1"));
    }

    #[test]
    fn init_request_includes_folder() {
        let req = InitUploadRequest {
            filename: "a.txt".into(),
            hash: "h".into(),
            total_size: 1,
            total_chunks: 1,
            folder: Some("docs".into()),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"folder\":\"docs\""));
    }

    #[test]
    fn complete_request_field_names() {
        let req = CompleteUploadRequest {
            upload_id: "u1".into(),
            add_to_index: true,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["upload_id"], "u1");
        assert_eq!(value["add_to_index"], true);
    }

    #[test]
    fn check_response_tolerates_missing_fields() {
        let resp: CheckResponse = serde_json::from_str(r#"{"error":"bad json"}"#).unwrap();
        assert!(!resp.exists);
        assert_eq!(resp.error.as_deref(), Some("bad json"));
    }

    #[test]
    fn complete_response_null_index_data() {
        let json = r#"{"success":true,"xml_parsed":true,"parse_status":0,"parse_output":"3 items","index_data":null}"#;
        let resp: CompleteUploadResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.xml_parsed, Some(true));
        assert_eq!(resp.parse_status, Some(0));
        assert!(resp.index_data.is_none());
    }

    #[test]
    fn complete_response_with_index_payload() {
        let json = r#"{
            "success": true,
            "file_path": "./uploads/abc.txt",
            "index_info": {"filename": "abc.txt", "hash": "abc", "file_type": ".txt"},
            "index_data": {"docid": 7, "title": "abc.txt", "text": "abc.txt hello"},
            "multimodal_indexed": false
        }"#;
        let resp: CompleteUploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.index_info.unwrap().file_type, ".txt");
        assert_eq!(resp.index_data.unwrap()["docid"], 7);
        assert_eq!(resp.multimodal_indexed, Some(false));
    }

    #[test]
    fn progress_response_null_percentage() {
        let json = r#"{"success":true,"uploaded_size":0,"total_size":0,"progress":null,"completed":false,"uploaded_chunks":0,"total_chunks":0}"#;
        let resp: ProgressResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.progress, None);
    }
}

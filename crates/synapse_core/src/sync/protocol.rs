//! Wire payloads exchanged with the remote capture endpoint.
//!
//! Request: `{accessKey,title,content,type,category,tags,wikilinks,timestamp}`.
//! Response: `{status:"success",data:{summary,category,fileUrl}}` or
//! `{status:"error",message}`.

use super::SyncError;
use crate::model::note::{NoteRecord, NoteType};
use serde::{Deserialize, Serialize};

/// Outbound body; borrows from the stored record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest<'a> {
    pub access_key: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    #[serde(rename = "type")]
    pub kind: NoteType,
    pub category: &'a str,
    pub tags: &'a [String],
    pub wikilinks: &'a [String],
    pub timestamp: &'a str,
}

impl<'a> From<&'a NoteRecord> for SyncRequest<'a> {
    fn from(record: &'a NoteRecord) -> Self {
        Self {
            access_key: &record.access_key,
            title: &record.title,
            content: &record.content,
            kind: record.kind,
            category: &record.category,
            tags: &record.tags,
            wikilinks: &record.wikilinks,
            timestamp: &record.timestamp,
        }
    }
}

/// Remote enrichment fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub summary: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Response envelope discriminated by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncResponse {
    Success {
        data: SyncData,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

/// Encodes the outbound body for `record`.
pub fn encode_request(record: &NoteRecord) -> Result<String, SyncError> {
    serde_json::to_string(&SyncRequest::from(record))
        .map_err(|err| SyncError::Protocol(format!("failed to encode request: {err}")))
}

/// Parses a response body into an envelope.
///
/// # Errors
/// - `SyncError::Protocol` for non-JSON bodies, unknown `status` values or
///   missing `data.summary`.
pub fn parse_response(body: &str) -> Result<SyncResponse, SyncError> {
    serde_json::from_str(body)
        .map_err(|err| SyncError::Protocol(format!("unexpected response body: {err}")))
}

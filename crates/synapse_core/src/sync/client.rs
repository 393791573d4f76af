//! Sync client: local commit, then remote or demo enrichment.

use super::fallback::fallback_summary;
use super::protocol::{encode_request, parse_response, SyncResponse};
use super::transport::{HttpTransport, RemoteTransport};
use super::SyncError;
use crate::config::SynapseConfig;
use crate::model::note::{NoteId, NoteRecord};
use crate::store::activity::{ActivityStore, PatchOutcome};
use crate::store::kv::KvStore;
use log::{error, info, warn};
use std::time::{Duration, Instant};

/// How a record was enriched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Remote endpoint answered with a summary.
    Remote,
    /// No endpoint configured; fallback summary derived locally.
    Demo,
}

/// Successful sync result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub record_id: NoteId,
    pub mode: SyncMode,
    pub patch: PatchOutcome,
    /// Remote file location, when the endpoint stored one.
    pub file_url: Option<String>,
    /// `false` when the store could not be written; the record then only
    /// lives in memory and is gone once the process exits.
    pub persisted: bool,
}

/// Sends records to the configured endpoint.
pub struct SyncClient<T: RemoteTransport> {
    endpoint: Option<String>,
    transport: T,
    demo_delay: Duration,
}

impl SyncClient<HttpTransport> {
    /// Builds an HTTP client from validated configuration.
    pub fn from_config(config: &SynapseConfig) -> Result<Self, SyncError> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(
            config.endpoint.clone(),
            transport,
            config.demo_delay(),
        ))
    }
}

impl<T: RemoteTransport> SyncClient<T> {
    pub fn new(endpoint: Option<String>, transport: T, demo_delay: Duration) -> Self {
        Self {
            endpoint,
            transport,
            demo_delay,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.endpoint.is_none()
    }

    /// Commits `record` locally, then enriches it.
    ///
    /// # Errors
    /// - `SyncError` for remote failures. The record stays in `store`
    ///   without a summary.
    pub fn send<K: KvStore>(
        &self,
        store: &mut ActivityStore<K>,
        record: NoteRecord,
    ) -> Result<SyncReport, SyncError> {
        let started_at = Instant::now();
        let record_id = record.id;

        if let Err(err) = store.add(record.clone()) {
            error!(
                "event=sync_send module=sync status=error note_id={} error_code=local_persist_failed error={}",
                record_id, err
            );
        }

        let result = match &self.endpoint {
            Some(endpoint) => self.enrich_remote(endpoint, store, &record),
            None => Ok(self.enrich_demo(store, &record)),
        };

        match &result {
            Ok(report) => info!(
                "event=sync_send module=sync status=ok note_id={} mode={:?} patch={:?} duration_ms={}",
                record_id,
                report.mode,
                report.patch,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=sync_send module=sync status=error note_id={} error_code={} duration_ms={} error={}",
                record_id,
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn enrich_remote<K: KvStore>(
        &self,
        endpoint: &str,
        store: &mut ActivityStore<K>,
        record: &NoteRecord,
    ) -> Result<SyncReport, SyncError> {
        let body = encode_request(record)?;
        let response = self.transport.post_json(endpoint, body)?;

        let envelope = match parse_response(&response.body) {
            Ok(envelope) => envelope,
            Err(_) if !response.is_success() => {
                return Err(SyncError::Protocol(format!(
                    "unexpected http status {}",
                    response.status
                )));
            }
            Err(err) => return Err(err),
        };

        match envelope {
            SyncResponse::Success { data } => {
                let patch = apply_patch(store, record.id, data.summary, data.category.as_deref());
                Ok(SyncReport {
                    record_id: record.id,
                    mode: SyncMode::Remote,
                    patch,
                    file_url: data.file_url.filter(|url| !url.is_empty()),
                    persisted: store.is_persisted(),
                })
            }
            SyncResponse::Error { message } => Err(SyncError::Rejected(message)),
        }
    }

    fn enrich_demo<K: KvStore>(
        &self,
        store: &mut ActivityStore<K>,
        record: &NoteRecord,
    ) -> SyncReport {
        let summary = fallback_summary(&record.content);
        let patch = apply_patch(store, record.id, summary, None);
        if !self.demo_delay.is_zero() {
            std::thread::sleep(self.demo_delay);
        }
        SyncReport {
            record_id: record.id,
            mode: SyncMode::Demo,
            patch,
            file_url: None,
            persisted: store.is_persisted(),
        }
    }
}

fn apply_patch<K: KvStore>(
    store: &mut ActivityStore<K>,
    record_id: NoteId,
    summary: String,
    category: Option<&str>,
) -> PatchOutcome {
    match store.patch(record_id, summary, category) {
        Ok(outcome) => outcome,
        Err(err) => {
            // Only a persistence failure after the in-memory patch lands here.
            error!(
                "event=sync_patch module=sync status=error note_id={} error_code=local_persist_failed error={}",
                record_id, err
            );
            PatchOutcome::Applied
        }
    }
}

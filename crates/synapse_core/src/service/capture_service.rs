//! Capture use-case service: the save boundary.
//!
//! # Responsibility
//! - Gate capture on an unlocked session.
//! - Validate draft input and build the record.
//! - Hand the record to the sync client and fold every outcome into one
//!   structured result for the presentation layer.
//!
//! # Invariants
//! - Nothing is stored when validation or the login gate refuses a save.
//! - Once a record passes validation it is in the in-memory store, whatever
//!   the remote outcome. Whether it also reached disk is reported with every
//!   result.

use crate::model::note::{NoteDraft, NoteId, NoteRecord, NoteValidationError};
use crate::store::activity::ActivityStore;
use crate::store::kv::KvStore;
use crate::store::session::Session;
use crate::sync::client::SyncClient;
use crate::sync::transport::RemoteTransport;
use crate::sync::SyncError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Presentation-level category of a failed save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    Locked,
    Validation,
    RemoteRejection,
    Network,
    Protocol,
}

/// Save failure.
#[derive(Debug)]
pub enum CaptureError {
    /// No access key entered yet.
    Locked,
    /// Draft refused; nothing stored.
    Validation(NoteValidationError),
    /// Remote sync failed after the record entered the store.
    Sync {
        record_id: NoteId,
        /// `false` when the local write failed too.
        persisted: bool,
        source: SyncError,
    },
}

impl CaptureError {
    pub fn kind(&self) -> CaptureErrorKind {
        match self {
            Self::Locked => CaptureErrorKind::Locked,
            Self::Validation(_) => CaptureErrorKind::Validation,
            Self::Sync { source, .. } => match source {
                SyncError::Rejected(_) => CaptureErrorKind::RemoteRejection,
                SyncError::Network(_) => CaptureErrorKind::Network,
                SyncError::Protocol(_) => CaptureErrorKind::Protocol,
            },
        }
    }

    /// Id of the locally saved record, when the failure happened after the
    /// local commit.
    pub fn saved_record(&self) -> Option<NoteId> {
        match self {
            Self::Sync { record_id, .. } => Some(*record_id),
            Self::Locked | Self::Validation(_) => None,
        }
    }

    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Locked => "Enter your access key to start capturing.".to_string(),
            Self::Validation(_) => "Please enter some content.".to_string(),
            Self::Sync {
                persisted,
                source,
                ..
            } => {
                let local = if *persisted {
                    "Saved locally"
                } else {
                    "Not saved locally"
                };
                match source {
                    SyncError::Rejected(message) => {
                        format!("{local}; the server rejected the note: {message}")
                    }
                    SyncError::Network(_) | SyncError::Protocol(_) => {
                        format!("{local}, sync failed.")
                    }
                }
            }
        }
    }
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "capture is locked until an access key is entered"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Sync {
                record_id,
                persisted: true,
                source,
            } => write!(f, "note {record_id} saved locally but not synced: {source}"),
            Self::Sync {
                record_id, source, ..
            } => write!(f, "note {record_id} neither saved locally nor synced: {source}"),
        }
    }
}

impl Error for CaptureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Locked => None,
            Self::Validation(err) => Some(err),
            Self::Sync { source, .. } => Some(source),
        }
    }
}

impl From<NoteValidationError> for CaptureError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Record returned by a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    /// The record as it stands in the store, summary included when
    /// enrichment succeeded.
    pub record: NoteRecord,
    /// `false` when the store could not be written; the note is lost once
    /// the process exits.
    pub persisted: bool,
}

/// Capture facade over session, activity store and sync client.
pub struct CaptureService<K: KvStore, T: RemoteTransport> {
    session: Session<K>,
    store: ActivityStore<K>,
    sync: SyncClient<T>,
}

impl<K: KvStore, T: RemoteTransport> CaptureService<K, T> {
    pub fn new(session: Session<K>, store: ActivityStore<K>, sync: SyncClient<T>) -> Self {
        Self {
            session,
            store,
            sync,
        }
    }

    /// Saves one draft.
    ///
    /// # Errors
    /// - `Locked` / `Validation` before anything is stored.
    /// - `Sync` when enrichment failed; `persisted` tells whether the local
    ///   copy reached disk.
    pub fn save(&mut self, draft: &NoteDraft) -> Result<SavedNote, CaptureError> {
        let Some(access_key) = self.session.access_key() else {
            warn!("event=capture_save module=service status=error error_code=locked");
            return Err(CaptureError::Locked);
        };
        let record = NoteRecord::from_draft(draft, access_key).map_err(|err| {
            warn!(
                "event=capture_save module=service status=error error_code=validation kind={}",
                draft.kind
            );
            CaptureError::from(err)
        })?;
        let record_id = record.id;
        let fallback = record.clone();

        let result = self.sync.send(&mut self.store, record);
        let stored = self.store.get(record_id).cloned().unwrap_or(fallback);
        let persisted = self.store.is_persisted();

        match result {
            Ok(report) => {
                info!(
                    "event=capture_save module=service status=ok note_id={} kind={} mode={:?} persisted={}",
                    record_id, stored.kind, report.mode, persisted
                );
                Ok(SavedNote {
                    record: stored,
                    persisted,
                })
            }
            Err(source) => Err(CaptureError::Sync {
                record_id,
                persisted,
                source,
            }),
        }
    }

    pub fn session_mut(&mut self) -> &mut Session<K> {
        &mut self.session
    }

    pub fn store(&self) -> &ActivityStore<K> {
        &self.store
    }
}

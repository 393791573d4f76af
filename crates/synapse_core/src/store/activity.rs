//! Bounded newest-first cache of captured records.
//!
//! # Invariants
//! - `records` is ordered newest-first and never longer than `ACTIVITY_LIMIT`.
//! - Records leave the list only through tail eviction on `add`.
//! - A record's `summary` is set at most once.
//! - The full list is persisted as JSON under `ACTIVITIES_KEY` after every
//!   mutation.

use super::kv::KvStore;
use super::{StoreError, StoreResult};
use crate::model::note::{NoteId, NoteRecord};
use log::{debug, info};

/// Key under which the serialized activity list is stored.
pub const ACTIVITIES_KEY: &str = "synapse_activities";
/// Maximum number of records kept locally.
pub const ACTIVITY_LIMIT: usize = 10;

/// Result of an enrichment patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Summary (and optional category) were written.
    Applied,
    /// Target already carried a summary; nothing changed.
    AlreadyEnriched,
    /// Target is gone (evicted, unknown id, or empty store).
    NotFound,
}

/// Owner of the locally cached activity list.
pub struct ActivityStore<K: KvStore> {
    kv: K,
    records: Vec<NoteRecord>,
    persisted: bool,
}

impl<K: KvStore> ActivityStore<K> {
    /// Loads persisted records; a missing entry yields an empty store.
    ///
    /// # Errors
    /// - `StoreError::Decode` when the persisted value is not a record list.
    /// - `StoreError::Db` on storage failure.
    pub fn load(kv: K) -> StoreResult<Self> {
        let mut records = match kv.get(ACTIVITIES_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<NoteRecord>>(&raw).map_err(|source| {
                StoreError::Decode {
                    key: ACTIVITIES_KEY,
                    source,
                }
            })?,
            None => Vec::new(),
        };
        records.truncate(ACTIVITY_LIMIT);

        info!(
            "event=activity_load module=store status=ok count={}",
            records.len()
        );
        Ok(Self {
            kv,
            records,
            persisted: true,
        })
    }

    /// Prepends one record, evicting the oldest beyond the limit.
    ///
    /// The in-memory insert always happens; an `Err` only reports that the
    /// list could not be persisted.
    pub fn add(&mut self, record: NoteRecord) -> StoreResult<()> {
        debug!(
            "event=activity_add module=store status=start note_id={}",
            record.id
        );
        self.records.insert(0, record);
        if self.records.len() > ACTIVITY_LIMIT {
            if let Some(evicted) = self.records.pop() {
                info!(
                    "event=activity_evict module=store status=ok note_id={}",
                    evicted.id
                );
            }
        }
        self.persist()
    }

    /// Patches the newest record.
    ///
    /// No-op returning `NotFound` on an empty store.
    pub fn patch_latest(
        &mut self,
        summary: impl Into<String>,
        category: Option<&str>,
    ) -> StoreResult<PatchOutcome> {
        match self.records.first().map(|record| record.id) {
            Some(id) => self.patch(id, summary, category),
            None => Ok(PatchOutcome::NotFound),
        }
    }

    /// Patches the record with `id`.
    ///
    /// A miss is not an error. An `Err` is returned only when the patch was
    /// applied in memory but could not be persisted.
    pub fn patch(
        &mut self,
        id: NoteId,
        summary: impl Into<String>,
        category: Option<&str>,
    ) -> StoreResult<PatchOutcome> {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            debug!("event=activity_patch module=store status=miss note_id={id}");
            return Ok(PatchOutcome::NotFound);
        };
        if record.summary.is_some() {
            return Ok(PatchOutcome::AlreadyEnriched);
        }

        record.summary = Some(summary.into());
        if let Some(category) = category.map(str::trim).filter(|value| !value.is_empty()) {
            record.category = category.to_string();
        }
        self.persist()?;
        Ok(PatchOutcome::Applied)
    }

    /// Current records, newest-first.
    pub fn all(&self) -> &[NoteRecord] {
        &self.records
    }

    pub fn get(&self, id: NoteId) -> Option<&NoteRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `true` when the in-memory list matches what was last written to the
    /// key-value store.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn persist(&mut self) -> StoreResult<()> {
        let result = serde_json::to_string(&self.records)
            .map_err(StoreError::Encode)
            .and_then(|raw| self.kv.set(ACTIVITIES_KEY, &raw));
        self.persisted = result.is_ok();
        result
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use super::{DataClient, Latency};
use crate::entity::Entity;
use crate::error::{BugHiveError, Result};
use crate::patch::MergePolicy;
use crate::types::{EntityId, Timestamp};

struct Slot<E> {
    seq: u64,
    record: E,
}

/// In-process store for one entity type.
///
/// Records live in a `DashMap` keyed by id. Ids are drawn from a counter that
/// never goes backwards, so an id is never handed out twice even after the
/// record holding it is deleted.
pub struct MemoryStore<E: Entity> {
    records: DashMap<EntityId, Slot<E>>,
    next_seq: AtomicU64,
    latency: Latency,
    policy: MergePolicy,
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        MemoryStore {
            records: DashMap::new(),
            next_seq: AtomicU64::new(1),
            latency: Latency::default(),
            policy: MergePolicy::default(),
        }
    }

    /// Store pre-populated with `records`, kept in the given order.
    ///
    /// The id counter starts past the largest numeric id present.
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let store = Self::new();
        let mut max_numeric = 0;
        for (seq, record) in records.into_iter().enumerate() {
            if let Some(n) = record.id().as_seq() {
                max_numeric = max_numeric.max(n);
            }
            store.records.insert(
                record.id().clone(),
                Slot {
                    seq: seq as u64,
                    record,
                },
            );
        }
        let first_free = (max_numeric + 1).max(store.records.len() as u64 + 1);
        store.next_seq.store(first_free, Ordering::SeqCst);
        store
    }

    /// Never hand out an id below `next_id`. A lower value leaves the counter alone.
    pub fn with_next_id(self, next_id: u64) -> Self {
        self.next_seq.fetch_max(next_id, Ordering::SeqCst);
        self
    }

    /// The id the next insert will try first
    pub fn next_id(&self) -> u64 {
        self.next_seq.load(Ordering::SeqCst)
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order, without simulated latency
    pub fn snapshot(&self) -> Vec<E> {
        let mut slots: Vec<(u64, E)> = self
            .records
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        slots.sort_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, record)| record).collect()
    }

    fn not_found(&self, id: &EntityId) -> BugHiveError {
        warn!(kind = %E::KIND, %id, "record not found");
        BugHiveError::not_found(E::KIND, id.as_str())
    }
}

impl<E: Entity> DataClient<E> for MemoryStore<E> {
    async fn fetch_all(&self) -> Result<Vec<E>> {
        self.latency.wait().await;
        let records = self.snapshot();
        debug!(kind = %E::KIND, count = records.len(), "fetched all");
        Ok(records)
    }

    async fn fetch(&self, id: &EntityId) -> Result<E> {
        self.latency.wait().await;
        debug!(kind = %E::KIND, %id, "fetch");
        self.records
            .get(id)
            .map(|slot| slot.record.clone())
            .ok_or_else(|| self.not_found(id))
    }

    async fn insert(&self, draft: E::Draft) -> Result<E> {
        self.latency.wait().await;
        loop {
            let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
            let id = EntityId::from(seq);
            // A seeded record may already own a non-sequential numeric id.
            if let Entry::Vacant(vacant) = self.records.entry(id.clone()) {
                let record = E::from_draft(id, draft, Timestamp::now());
                vacant.insert(Slot {
                    seq,
                    record: record.clone(),
                });
                debug!(kind = %E::KIND, id = %record.id(), "inserted");
                return Ok(record);
            }
        }
    }

    async fn update(&self, id: &EntityId, patch: E::Patch, expected_version: Option<u64>) -> Result<E> {
        self.latency.wait().await;
        let mut slot = self.records.get_mut(id).ok_or_else(|| self.not_found(id))?;

        let actual = slot.record.version();
        if let Some(expected) = expected_version
            && expected != actual
        {
            warn!(kind = %E::KIND, %id, expected, actual, "version conflict");
            return Err(BugHiveError::Conflict {
                kind: E::KIND,
                id: id.to_string(),
                expected,
                actual,
            });
        }

        slot.record.apply_patch(patch, self.policy);
        slot.record.touch(Timestamp::now());
        debug!(kind = %E::KIND, %id, version = slot.record.version(), "updated");
        Ok(slot.record.clone())
    }

    async fn remove(&self, id: &EntityId) -> Result<()> {
        self.latency.wait().await;
        match self.records.remove(id) {
            Some(_) => {
                debug!(kind = %E::KIND, %id, "removed");
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }
}

//! Backing stores for entity records
//!
//! A [`DataClient`] is the CRUD capability the service layer talks to. Two
//! implementations exist: [`MemoryStore`], a concurrent in-process map with
//! optional simulated latency, and [`RestClient`], which maps raw records
//! from a remote table API into canonical entities.

pub mod mapping;
pub mod memory;
pub mod rest;

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::Result;
use crate::types::EntityId;

pub use mapping::RemoteRecord;
pub use memory::MemoryStore;
pub use rest::{RestClient, RestSettings};

/// CRUD access to one collection of records
pub trait DataClient<E: Entity>: Send + Sync {
    /// Every record, in insertion order
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// A single record, or `NotFound`
    fn fetch(&self, id: &EntityId) -> impl Future<Output = Result<E>> + Send;

    /// Store a new record. The store assigns id, timestamps and version.
    fn insert(&self, draft: E::Draft) -> impl Future<Output = Result<E>> + Send;

    /// Merge `patch` into the record.
    ///
    /// With `expected_version`, the write only happens if the stored version
    /// still matches; otherwise the call fails with `Conflict`.
    fn update(
        &self,
        id: &EntityId,
        patch: E::Patch,
        expected_version: Option<u64>,
    ) -> impl Future<Output = Result<E>> + Send;

    /// Delete the record, or fail with `NotFound`
    fn remove(&self, id: &EntityId) -> impl Future<Output = Result<()>> + Send;
}

/// Simulated round-trip delay for the in-memory store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latency {
    #[serde(default)]
    pub base_ms: u64,
    #[serde(default)]
    pub jitter_ms: u64,
}

impl Latency {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Latency { base_ms, jitter_ms }
    }

    pub fn is_zero(&self) -> bool {
        self.base_ms == 0 && self.jitter_ms == 0
    }

    /// Draw one delay in `base_ms..=base_ms + jitter_ms`
    pub fn sample(&self) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        Duration::from_millis(self.base_ms + jitter)
    }

    pub async fn wait(&self) {
        if self.is_zero() {
            return;
        }
        let delay = self.sample();
        tokio::time::sleep(delay).await;
    }
}

/// The configured store for one entity type
pub enum Backend<E: Entity> {
    Memory(MemoryStore<E>),
    Rest(RestClient<E>),
}

impl<E: Entity> Backend<E> {
    /// The in-memory store, if this backend is one
    pub fn as_memory(&self) -> Option<&MemoryStore<E>> {
        match self {
            Backend::Memory(store) => Some(store),
            Backend::Rest(_) => None,
        }
    }
}

impl<E: RemoteRecord> DataClient<E> for Backend<E> {
    async fn fetch_all(&self) -> Result<Vec<E>> {
        match self {
            Backend::Memory(store) => store.fetch_all().await,
            Backend::Rest(client) => client.fetch_all().await,
        }
    }

    async fn fetch(&self, id: &EntityId) -> Result<E> {
        match self {
            Backend::Memory(store) => store.fetch(id).await,
            Backend::Rest(client) => client.fetch(id).await,
        }
    }

    async fn insert(&self, draft: E::Draft) -> Result<E> {
        match self {
            Backend::Memory(store) => store.insert(draft).await,
            Backend::Rest(client) => client.insert(draft).await,
        }
    }

    async fn update(&self, id: &EntityId, patch: E::Patch, expected_version: Option<u64>) -> Result<E> {
        match self {
            Backend::Memory(store) => store.update(id, patch, expected_version).await,
            Backend::Rest(client) => client.update(id, patch, expected_version).await,
        }
    }

    async fn remove(&self, id: &EntityId) -> Result<()> {
        match self {
            Backend::Memory(store) => store.remove(id).await,
            Backend::Rest(client) => client.remove(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_sample_in_range() {
        let latency = Latency::new(10, 5);
        for _ in 0..50 {
            let ms = latency.sample().as_millis();
            assert!((10..=15).contains(&ms), "sampled {ms}ms");
        }
    }

    #[test]
    fn test_latency_without_jitter_is_fixed() {
        assert_eq!(Latency::new(7, 0).sample(), Duration::from_millis(7));
        assert!(Latency::default().is_zero());
    }

    #[tokio::test]
    async fn test_zero_latency_returns_immediately() {
        let start = std::time::Instant::now();
        Latency::default().wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}

//! Entity services
//!
//! [`EntityService`] is the CRUD facade the forms, pages and CLI talk to. It
//! owns a [`DataClient`] and adds logging plus the per-id serialization that
//! compound read-modify-write operations need. Entity-specific helpers
//! (`update_status`, `execute`, ...) live in the submodules as inherent impls
//! on the concrete service aliases.

pub mod comment;
pub mod locks;
pub mod test_case;
pub mod ticket;

use std::marker::PhantomData;

use tracing::{debug, info};

use crate::config::Config;
use crate::entity::{Comment, Entity, TestCase, Ticket, User};
use crate::error::Result;
use crate::seed::{NextIds, SeedData};
use crate::store::{Backend, DataClient, MemoryStore, RestClient};
use crate::types::{EntityId, UserRef};

pub use locks::KeyedLocks;
pub use test_case::EXECUTE_ATTEMPTS;

pub type TicketService<C = Backend<Ticket>> = EntityService<Ticket, C>;
pub type TestCaseService<C = Backend<TestCase>> = EntityService<TestCase, C>;
pub type UserService<C = Backend<User>> = EntityService<User, C>;
pub type CommentService<C = Backend<Comment>> = EntityService<Comment, C>;

/// CRUD facade over one [`DataClient`]
pub struct EntityService<E: Entity, C> {
    client: C,
    locks: KeyedLocks,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, C: DataClient<E>> EntityService<E, C> {
    pub fn new(client: C) -> Self {
        EntityService {
            client,
            locks: KeyedLocks::default(),
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn get_all(&self) -> Result<Vec<E>> {
        self.client.fetch_all().await
    }

    pub async fn get_by_id(&self, id: &EntityId) -> Result<E> {
        self.client.fetch(id).await
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E> {
        let record = self.client.insert(draft).await?;
        info!(kind = %E::KIND, id = %record.id(), "created");
        Ok(record)
    }

    /// Merge `patch` into the record, last write wins
    pub async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E> {
        debug!(kind = %E::KIND, %id, "update");
        self.client.update(id, patch, None).await
    }

    /// Merge `patch` only if the record is still at `expected_version`
    pub async fn update_versioned(
        &self,
        id: &EntityId,
        patch: E::Patch,
        expected_version: u64,
    ) -> Result<E> {
        debug!(kind = %E::KIND, %id, expected_version, "versioned update");
        self.client.update(id, patch, Some(expected_version)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<()> {
        self.client.remove(id).await?;
        info!(kind = %E::KIND, %id, "deleted");
        Ok(())
    }
}

/// Every service the application uses, wired to one backend configuration
pub struct Services {
    pub tickets: TicketService,
    pub test_cases: TestCaseService,
    pub users: UserService,
    pub comments: CommentService,
    /// Acting user for reporter and execution attribution
    pub identity: UserRef,
}

impl Services {
    /// Empty in-memory services with default settings
    pub fn in_memory() -> Self {
        Self::memory(&Config::default(), SeedData::default())
    }

    /// Build services for the configured backend.
    ///
    /// `seed` populates the in-memory store and is ignored by the REST backend.
    pub fn from_config(config: &Config, seed: SeedData) -> Result<Self> {
        match &config.backend {
            crate::config::BackendConfig::Memory => Ok(Self::memory(config, seed)),
            crate::config::BackendConfig::Rest(settings) => {
                let http = settings.http_client()?;
                let policy = config.merge;
                Ok(Services {
                    tickets: EntityService::new(Backend::Rest(RestClient::new(
                        http.clone(),
                        settings,
                        policy,
                    )?)),
                    test_cases: EntityService::new(Backend::Rest(RestClient::new(
                        http.clone(),
                        settings,
                        policy,
                    )?)),
                    users: EntityService::new(Backend::Rest(RestClient::new(
                        http.clone(),
                        settings,
                        policy,
                    )?)),
                    comments: EntityService::new(Backend::Rest(RestClient::new(
                        http, settings, policy,
                    )?)),
                    identity: config.identity.as_user_ref(),
                })
            }
        }
    }

    fn memory(config: &Config, seed: SeedData) -> Self {
        fn store<E: Entity>(records: Vec<E>, next_id: u64, config: &Config) -> Backend<E> {
            Backend::Memory(
                MemoryStore::with_records(records)
                    .with_next_id(next_id)
                    .with_latency(config.latency)
                    .with_policy(config.merge),
            )
        }

        let next = seed.next_ids;
        Services {
            tickets: EntityService::new(store(seed.tickets, next.tickets, config)),
            test_cases: EntityService::new(store(seed.test_cases, next.test_cases, config)),
            users: EntityService::new(store(seed.users, next.users, config)),
            comments: EntityService::new(store(seed.comments, next.comments, config)),
            identity: config.identity.as_user_ref(),
        }
    }

    /// Current contents of the in-memory stores, for writing back to disk.
    ///
    /// Returns `None` for remote backends.
    pub fn snapshot(&self) -> Option<SeedData> {
        let users = self.users.client().as_memory()?;
        let tickets = self.tickets.client().as_memory()?;
        let test_cases = self.test_cases.client().as_memory()?;
        let comments = self.comments.client().as_memory()?;
        Some(SeedData {
            users: users.snapshot(),
            tickets: tickets.snapshot(),
            test_cases: test_cases.snapshot(),
            comments: comments.snapshot(),
            next_ids: NextIds {
                users: users.next_id(),
                tickets: tickets.next_id(),
                test_cases: test_cases.next_id(),
                comments: comments.next_id(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CommentDraft, TicketDraft, TicketPatch};
    use crate::patch::Patch;
    use crate::types::TicketStatus;

    fn draft() -> TicketDraft {
        TicketDraft {
            title: "Checkout total wrong".to_string(),
            description: "Tax applied twice".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_get_matches() {
        let services = Services::in_memory();
        let created = services.tickets.create(draft()).await.unwrap();
        let fetched = services.tickets.get_by_id(&created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_update_versioned_conflict() {
        let services = Services::in_memory();
        let created = services.tickets.create(draft()).await.unwrap();
        services
            .tickets
            .update(&created.id, TicketPatch::status(TicketStatus::Testing))
            .await
            .unwrap();

        let err = services
            .tickets
            .update_versioned(
                &created.id,
                TicketPatch {
                    title: Patch::Set("stale".to_string()),
                    ..Default::default()
                },
                created.version,
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_snapshot_reflects_writes() {
        let services = Services::in_memory();
        services.tickets.create(draft()).await.unwrap();
        let snapshot = services.snapshot().unwrap();
        assert_eq!(snapshot.tickets.len(), 1);
        assert!(snapshot.test_cases.is_empty());
    }

    #[tokio::test]
    async fn test_reload_never_reuses_deleted_ids() {
        let services = Services::in_memory();
        services.tickets.create(draft()).await.unwrap();
        let newest = services.tickets.create(draft()).await.unwrap();
        services
            .comments
            .create(CommentDraft {
                ticket_id: newest.id.clone(),
                author: None,
                content: "on the deleted ticket".to_string(),
            })
            .await
            .unwrap();
        services.tickets.delete(&newest.id).await.unwrap();

        let seed = services.snapshot().unwrap();
        let reloaded = Services::from_config(&Config::default(), seed).unwrap();
        let created = reloaded.tickets.create(draft()).await.unwrap();

        assert_ne!(created.id, newest.id);
        assert!(reloaded.comments.get_by_ticket_id(&created.id).await.is_empty());
    }

    #[test]
    fn test_identity_defaults_to_placeholder() {
        let services = Services::in_memory();
        assert_eq!(services.identity.name, "Current User");
    }
}

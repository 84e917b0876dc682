//! Canonical records held by the backing stores
//!
//! Each record type comes with a `Draft` (caller-supplied fields for create)
//! and a `Patch` (explicit partial update). Ids, timestamps and versions are
//! only ever assigned by the store.

pub mod comment;
pub mod test_case;
pub mod ticket;
pub mod user;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::patch::MergePolicy;
use crate::types::{EntityId, EntityKind, Timestamp};

pub use comment::{Comment, CommentDraft, CommentPatch};
pub use test_case::{ExecutionRecord, TestCase, TestCaseDraft, TestCasePatch};
pub use ticket::{Ticket, TicketDraft, TicketPatch};
pub use user::{User, UserDraft, UserPatch};

/// A record type that can live in a [`DataClient`](crate::store::DataClient).
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Clone + fmt::Debug + Send + Sync + 'static;
    type Patch: Clone + fmt::Debug + Default + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    /// Monotonic revision, bumped on every write
    fn version(&self) -> u64;

    /// Build the stored record from a draft and store-assigned identity
    fn from_draft(id: EntityId, draft: Self::Draft, now: Timestamp) -> Self;

    /// Merge a patch in place. Does not touch timestamps or version.
    fn apply_patch(&mut self, patch: Self::Patch, policy: MergePolicy);

    /// Mark the record as written at `now`
    fn touch(&mut self, now: Timestamp);
}

/// Drop blank entries and surrounding whitespace from a list of strings
pub(crate) fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

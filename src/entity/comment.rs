use serde::{Deserialize, Serialize};

use super::Entity;
use crate::patch::{MergePolicy, Patch};
use crate::types::{EntityId, EntityKind, Timestamp, UserRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub ticket_id: EntityId,
    #[serde(default)]
    pub author: Option<UserRef>,
    pub content: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub ticket_id: EntityId,
    #[serde(default)]
    pub author: Option<UserRef>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub content: Patch<String>,
}

impl Entity for Comment {
    type Draft = CommentDraft;
    type Patch = CommentPatch;

    const KIND: EntityKind = EntityKind::Comment;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn from_draft(id: EntityId, draft: CommentDraft, now: Timestamp) -> Self {
        Comment {
            id,
            ticket_id: draft.ticket_id,
            author: draft.author,
            content: draft.content,
            created_at: now,
            version: 1,
        }
    }

    fn apply_patch(&mut self, patch: CommentPatch, policy: MergePolicy) {
        patch.content.apply_to(&mut self.content, policy);
    }

    // Comments carry no modification time.
    fn touch(&mut self, _now: Timestamp) {
        self.version += 1;
    }
}

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::patch::{MergePolicy, Patch};
use crate::types::{EntityId, EntityKind, TicketPriority, TicketStatus, Timestamp, UserRef};

/// A bug report as confirmed by the backing store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub steps_to_reproduce: String,
    #[serde(default)]
    pub expected_behavior: String,
    #[serde(default)]
    pub actual_behavior: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub version: u64,
}

impl Ticket {
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().map(|a| a.name.as_str())
    }
}

/// Caller-supplied fields for a new ticket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assignee: Option<UserRef>,
    pub reporter: Option<UserRef>,
    pub steps_to_reproduce: String,
    pub expected_behavior: String,
    pub actual_behavior: String,
    pub attachments: Vec<String>,
}

/// Partial update for a ticket; `assignee: Set(None)` unassigns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub priority: Patch<TicketPriority>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub status: Patch<TicketStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub assignee: Patch<Option<UserRef>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub reporter: Patch<Option<UserRef>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub steps_to_reproduce: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub expected_behavior: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub actual_behavior: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub attachments: Patch<Vec<String>>,
}

impl TicketPatch {
    pub fn status(status: TicketStatus) -> Self {
        TicketPatch {
            status: Patch::Set(status),
            ..Default::default()
        }
    }

    pub fn assignee(assignee: Option<UserRef>) -> Self {
        TicketPatch {
            assignee: Patch::Set(assignee),
            ..Default::default()
        }
    }

    /// True when no field is present at all
    pub fn is_empty(&self) -> bool {
        *self == TicketPatch::default()
    }
}

impl Entity for Ticket {
    type Draft = TicketDraft;
    type Patch = TicketPatch;

    const KIND: EntityKind = EntityKind::Ticket;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn from_draft(id: EntityId, draft: TicketDraft, now: Timestamp) -> Self {
        Ticket {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            assignee: draft.assignee,
            reporter: draft.reporter,
            steps_to_reproduce: draft.steps_to_reproduce,
            expected_behavior: draft.expected_behavior,
            actual_behavior: draft.actual_behavior,
            attachments: draft.attachments,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn apply_patch(&mut self, patch: TicketPatch, policy: MergePolicy) {
        let TicketPatch {
            title,
            description,
            priority,
            status,
            assignee,
            reporter,
            steps_to_reproduce,
            expected_behavior,
            actual_behavior,
            attachments,
        } = patch;

        title.apply_to(&mut self.title, policy);
        description.apply_to(&mut self.description, policy);
        priority.apply_to(&mut self.priority, policy);
        status.apply_to(&mut self.status, policy);
        assignee.apply_to(&mut self.assignee, policy);
        reporter.apply_to(&mut self.reporter, policy);
        steps_to_reproduce.apply_to(&mut self.steps_to_reproduce, policy);
        expected_behavior.apply_to(&mut self.expected_behavior, policy);
        actual_behavior.apply_to(&mut self.actual_behavior, policy);
        attachments.apply_to(&mut self.attachments, policy);
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}

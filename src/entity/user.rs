use serde::{Deserialize, Serialize};

use super::Entity;
use crate::patch::{MergePolicy, Patch};
use crate::types::{EntityId, EntityKind, Timestamp, UserRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub version: u64,
}

impl User {
    /// By-value reference for embedding in tickets and comments
    pub fn as_user_ref(&self) -> UserRef {
        UserRef::new(self.id.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub role: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub avatar: Patch<Option<String>>,
}

impl Entity for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn from_draft(id: EntityId, draft: UserDraft, now: Timestamp) -> Self {
        User {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            avatar: draft.avatar,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch, policy: MergePolicy) {
        patch.name.apply_to(&mut self.name, policy);
        patch.email.apply_to(&mut self.email, policy);
        patch.role.apply_to(&mut self.role, policy);
        patch.avatar.apply_to(&mut self.avatar, policy);
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ref_copies_name() {
        let draft = UserDraft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: "Developer".to_string(),
            avatar: None,
        };
        let mut user = User::from_draft(EntityId::new("3"), draft, Timestamp::UNIX_EPOCH);
        let reference = user.as_user_ref();

        let rename = UserPatch {
            name: Patch::Set("Grace".to_string()),
            ..Default::default()
        };
        user.apply_patch(rename, MergePolicy::Explicit);

        assert_eq!(reference, UserRef::new("3", "Ada"));
        assert_eq!(user.name, "Grace");
    }
}

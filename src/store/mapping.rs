//! Raw remote record mapping
//!
//! The remote table API returns records with system columns (`Id`, `Name`,
//! `CreatedOn`, `ModifiedOn`) next to snake_case data columns. Missing text
//! columns read as empty, missing enums read as their defaults, and the
//! record version is derived from the modification time.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::entity::{
    Comment, CommentDraft, CommentPatch, Entity, TestCase, TestCaseDraft, TestCasePatch, Ticket,
    TicketDraft, TicketPatch, User, UserDraft, UserPatch,
};
use crate::error::{BugHiveError, Result};
use crate::patch::{MergePolicy, Patch};
use crate::types::{EntityId, EntityKind, TicketPriority, TicketStatus, Timestamp, UserRef};

/// An entity that can be stored in a remote table
pub trait RemoteRecord: Entity {
    /// Table name on the remote side
    const TABLE: &'static str;

    fn from_raw(raw: Value) -> Result<Self>;

    fn draft_to_raw(draft: &Self::Draft, now: Timestamp) -> Value;

    /// Columns to send for an update. Always includes the modification time.
    fn patch_to_raw(patch: &Self::Patch, policy: MergePolicy, now: Timestamp) -> Value;
}

/// Version token for a remote record
pub fn version_of(updated_at: Timestamp) -> u64 {
    u64::try_from(updated_at.as_millisecond()).unwrap_or(0)
}

fn malformed(kind: EntityKind, err: impl std::fmt::Display) -> BugHiveError {
    BugHiveError::Service(format!("malformed {kind} record: {err}"))
}

fn required_time(
    kind: EntityKind,
    primary: Option<Timestamp>,
    fallback: Option<Timestamp>,
    column: &str,
) -> Result<Timestamp> {
    primary
        .or(fallback)
        .ok_or_else(|| malformed(kind, format!("missing {column}")))
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Remote references only carry the user id; it doubles as the display name.
fn user_ref(value: Option<String>) -> Option<UserRef> {
    value
        .filter(|id| !id.is_empty())
        .map(|id| UserRef::new(id.clone(), id))
}

fn user_id(value: &Option<UserRef>) -> String {
    value
        .as_ref()
        .map(|u| u.id.to_string())
        .unwrap_or_default()
}

/// Insert the columns a `Set` patch field carries, honouring the merge policy
fn put<T, F>(columns: &mut Map<String, Value>, field: &Patch<T>, policy: MergePolicy, to_columns: F)
where
    T: crate::patch::Blank,
    F: FnOnce(&T) -> Vec<(&'static str, Value)>,
{
    if field.is_effective(policy)
        && let Some(value) = field.as_set()
    {
        for (column, raw) in to_columns(value) {
            columns.insert(column.to_string(), raw);
        }
    }
}

#[derive(Deserialize)]
struct RawTicket {
    #[serde(rename = "Id")]
    id: EntityId,
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    reporter: Option<String>,
    steps_to_reproduce: Option<String>,
    expected_behavior: Option<String>,
    actual_behavior: Option<String>,
    created_at: Option<Timestamp>,
    #[serde(rename = "CreatedOn")]
    created_on: Option<Timestamp>,
    updated_at: Option<Timestamp>,
    #[serde(rename = "ModifiedOn")]
    modified_on: Option<Timestamp>,
}

fn parse_or_default<T: std::str::FromStr<Err = BugHiveError> + Default>(
    value: Option<String>,
) -> Result<T> {
    match value {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Ok(T::default()),
    }
}

impl RemoteRecord for Ticket {
    const TABLE: &'static str = "ticket";

    fn from_raw(raw: Value) -> Result<Self> {
        let raw: RawTicket =
            serde_json::from_value(raw).map_err(|e| malformed(EntityKind::Ticket, e))?;
        let created_at = required_time(EntityKind::Ticket, raw.created_at, raw.created_on, "created_at")?;
        let updated_at = raw.updated_at.or(raw.modified_on).unwrap_or(created_at);
        Ok(Ticket {
            id: raw.id,
            title: text(raw.title),
            description: text(raw.description),
            priority: parse_or_default::<TicketPriority>(raw.priority)?,
            status: parse_or_default::<TicketStatus>(raw.status)?,
            assignee: user_ref(raw.assignee),
            reporter: user_ref(raw.reporter),
            steps_to_reproduce: text(raw.steps_to_reproduce),
            expected_behavior: text(raw.expected_behavior),
            actual_behavior: text(raw.actual_behavior),
            attachments: Vec::new(),
            created_at,
            updated_at,
            version: version_of(updated_at),
        })
    }

    fn draft_to_raw(draft: &TicketDraft, now: Timestamp) -> Value {
        json!({
            "Name": draft.title,
            "title": draft.title,
            "description": draft.description,
            "priority": draft.priority.as_str(),
            "status": draft.status.as_str(),
            "assignee": user_id(&draft.assignee),
            "reporter": user_id(&draft.reporter),
            "steps_to_reproduce": draft.steps_to_reproduce,
            "expected_behavior": draft.expected_behavior,
            "actual_behavior": draft.actual_behavior,
            "created_at": now,
            "updated_at": now,
        })
    }

    fn patch_to_raw(patch: &TicketPatch, policy: MergePolicy, now: Timestamp) -> Value {
        let mut columns = Map::new();
        put(&mut columns, &patch.title, policy, |v| {
            vec![("title", json!(v)), ("Name", json!(v))]
        });
        put(&mut columns, &patch.description, policy, |v| {
            vec![("description", json!(v))]
        });
        put(&mut columns, &patch.priority, policy, |v| {
            vec![("priority", json!(v.as_str()))]
        });
        put(&mut columns, &patch.status, policy, |v| {
            vec![("status", json!(v.as_str()))]
        });
        put(&mut columns, &patch.assignee, policy, |v| {
            vec![("assignee", json!(user_id(v)))]
        });
        put(&mut columns, &patch.reporter, policy, |v| {
            vec![("reporter", json!(user_id(v)))]
        });
        put(&mut columns, &patch.steps_to_reproduce, policy, |v| {
            vec![("steps_to_reproduce", json!(v))]
        });
        put(&mut columns, &patch.expected_behavior, policy, |v| {
            vec![("expected_behavior", json!(v))]
        });
        put(&mut columns, &patch.actual_behavior, policy, |v| {
            vec![("actual_behavior", json!(v))]
        });
        columns.insert("updated_at".to_string(), json!(now));
        Value::Object(columns)
    }
}

/// Copy a system column onto its canonical name when the canonical one is absent
fn alias_column(object: &mut Map<String, Value>, canonical: &str, aliases: &[&str]) {
    if object.get(canonical).is_some_and(|v| !v.is_null()) {
        return;
    }
    for alias in aliases {
        if let Some(value) = object.get(*alias).filter(|v| !v.is_null()).cloned() {
            object.insert(canonical.to_string(), value);
            return;
        }
    }
}

impl RemoteRecord for TestCase {
    const TABLE: &'static str = "test_cases";

    // Test case rows are stored in canonical camelCase; only the system
    // columns need renaming.
    fn from_raw(raw: Value) -> Result<Self> {
        let Value::Object(mut object) = raw else {
            return Err(malformed(EntityKind::TestCase, "expected an object"));
        };
        alias_column(&mut object, "id", &["Id"]);
        alias_column(&mut object, "title", &["Name"]);
        alias_column(&mut object, "createdAt", &["created_at", "CreatedOn"]);
        alias_column(&mut object, "updatedAt", &["updated_at", "ModifiedOn", "createdAt"]);

        let mut test_case: TestCase = serde_json::from_value(Value::Object(object))
            .map_err(|e| malformed(EntityKind::TestCase, e))?;
        test_case.estimated_time = test_case
            .estimated_time
            .max(crate::entity::test_case::MIN_ESTIMATED_TIME);
        test_case.version = version_of(test_case.updated_at);
        Ok(test_case)
    }

    fn draft_to_raw(draft: &TestCaseDraft, now: Timestamp) -> Value {
        let mut value = serde_json::to_value(draft).unwrap_or_else(|_| json!({}));
        if let Value::Object(object) = &mut value {
            object.insert("Name".to_string(), json!(draft.title));
            object.insert(
                "estimatedTime".to_string(),
                json!(draft.estimated_time.max(crate::entity::test_case::MIN_ESTIMATED_TIME)),
            );
            object.insert("status".to_string(), json!("Pending"));
            object.insert("executionHistory".to_string(), json!([]));
            object.insert("lastExecuted".to_string(), Value::Null);
            object.insert("createdAt".to_string(), json!(now));
            object.insert("updatedAt".to_string(), json!(now));
        }
        value
    }

    fn patch_to_raw(patch: &TestCasePatch, policy: MergePolicy, now: Timestamp) -> Value {
        let mut columns = Map::new();
        put(&mut columns, &patch.title, policy, |v| {
            vec![("title", json!(v)), ("Name", json!(v))]
        });
        put(&mut columns, &patch.description, policy, |v| vec![("description", json!(v))]);
        put(&mut columns, &patch.category, policy, |v| vec![("category", json!(v))]);
        put(&mut columns, &patch.priority, policy, |v| vec![("priority", json!(v))]);
        put(&mut columns, &patch.test_type, policy, |v| vec![("testType", json!(v))]);
        put(&mut columns, &patch.preconditions, policy, |v| vec![("preconditions", json!(v))]);
        put(&mut columns, &patch.test_steps, policy, |v| vec![("testSteps", json!(v))]);
        put(&mut columns, &patch.expected_result, policy, |v| {
            vec![("expectedResult", json!(v))]
        });
        put(&mut columns, &patch.assigned_to, policy, |v| vec![("assignedTo", json!(v))]);
        if patch
            .estimated_time
            .as_set()
            .is_some_and(|m| *m >= crate::entity::test_case::MIN_ESTIMATED_TIME)
        {
            put(&mut columns, &patch.estimated_time, policy, |v| {
                vec![("estimatedTime", json!(v))]
            });
        }
        put(&mut columns, &patch.tags, policy, |v| vec![("tags", json!(v))]);
        put(&mut columns, &patch.status, policy, |v| vec![("status", json!(v))]);
        put(&mut columns, &patch.execution_history, policy, |v| {
            vec![("executionHistory", json!(v))]
        });
        put(&mut columns, &patch.last_executed, policy, |v| {
            vec![("lastExecuted", json!(v))]
        });
        columns.insert("updatedAt".to_string(), json!(now));
        Value::Object(columns)
    }
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(rename = "Id")]
    id: EntityId,
    #[serde(rename = "Name")]
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    avatar: Option<String>,
    #[serde(rename = "CreatedOn")]
    created_on: Option<Timestamp>,
    #[serde(rename = "ModifiedOn")]
    modified_on: Option<Timestamp>,
}

impl RemoteRecord for User {
    const TABLE: &'static str = "User1";

    fn from_raw(raw: Value) -> Result<Self> {
        let raw: RawUser =
            serde_json::from_value(raw).map_err(|e| malformed(EntityKind::User, e))?;
        let created_at = required_time(EntityKind::User, raw.created_on, None, "CreatedOn")?;
        let updated_at = raw.modified_on.unwrap_or(created_at);
        Ok(User {
            id: raw.id,
            name: text(raw.name),
            email: text(raw.email),
            role: text(raw.role),
            avatar: raw.avatar.filter(|a| !a.is_empty()),
            created_at,
            updated_at,
            version: version_of(updated_at),
        })
    }

    fn draft_to_raw(draft: &UserDraft, _now: Timestamp) -> Value {
        json!({
            "Name": draft.name,
            "email": draft.email,
            "role": draft.role,
            "avatar": draft.avatar.clone().unwrap_or_default(),
        })
    }

    fn patch_to_raw(patch: &UserPatch, policy: MergePolicy, _now: Timestamp) -> Value {
        let mut columns = Map::new();
        put(&mut columns, &patch.name, policy, |v| vec![("Name", json!(v))]);
        put(&mut columns, &patch.email, policy, |v| vec![("email", json!(v))]);
        put(&mut columns, &patch.role, policy, |v| vec![("role", json!(v))]);
        put(&mut columns, &patch.avatar, policy, |v| {
            vec![("avatar", json!(v.clone().unwrap_or_default()))]
        });
        Value::Object(columns)
    }
}

#[derive(Deserialize)]
struct RawComment {
    #[serde(rename = "Id")]
    id: EntityId,
    ticket_id: Option<EntityId>,
    author: Option<String>,
    content: Option<String>,
    created_at: Option<Timestamp>,
    #[serde(rename = "CreatedOn")]
    created_on: Option<Timestamp>,
    #[serde(rename = "ModifiedOn")]
    modified_on: Option<Timestamp>,
}

impl RemoteRecord for Comment {
    const TABLE: &'static str = "Comment1";

    fn from_raw(raw: Value) -> Result<Self> {
        let raw: RawComment =
            serde_json::from_value(raw).map_err(|e| malformed(EntityKind::Comment, e))?;
        let created_at =
            required_time(EntityKind::Comment, raw.created_at, raw.created_on, "created_at")?;
        Ok(Comment {
            id: raw.id,
            ticket_id: raw.ticket_id.unwrap_or_else(|| EntityId::new("")),
            author: user_ref(raw.author),
            content: text(raw.content),
            created_at,
            version: version_of(raw.modified_on.unwrap_or(created_at)),
        })
    }

    fn draft_to_raw(draft: &CommentDraft, now: Timestamp) -> Value {
        json!({
            "ticket_id": draft.ticket_id,
            "author": user_id(&draft.author),
            "content": draft.content,
            "created_at": now,
        })
    }

    fn patch_to_raw(patch: &CommentPatch, policy: MergePolicy, _now: Timestamp) -> Value {
        let mut columns = Map::new();
        put(&mut columns, &patch.content, policy, |v| vec![("content", json!(v))]);
        Value::Object(columns)
    }
}

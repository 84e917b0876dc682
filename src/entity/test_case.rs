use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;
use crate::patch::{MergePolicy, Patch};
use crate::types::{
    EntityId, EntityKind, ExecutionResult, TestCasePriority, TestCaseStatus, TestType, Timestamp,
};

/// Smallest allowed estimate, in minutes
pub const MIN_ESTIMATED_TIME: u32 = 1;

/// Estimate used by a fresh draft, in minutes
pub const DEFAULT_ESTIMATED_TIME: u32 = 5;

/// One immutable run of a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub result: ExecutionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub executed_at: Timestamp,
    pub executed_by: String,
}

impl ExecutionRecord {
    /// New record with a time-ordered id. Blank notes are stored as `None`.
    pub fn new(
        result: ExecutionResult,
        notes: Option<String>,
        executed_by: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        ExecutionRecord {
            id: Uuid::now_v7().to_string(),
            result,
            notes: notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            executed_at: now,
            executed_by: executed_by.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: TestCasePriority,
    #[serde(default)]
    pub test_type: TestType,
    #[serde(default)]
    pub preconditions: String,
    #[serde(default)]
    pub test_steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default = "default_estimated_time")]
    pub estimated_time: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: TestCaseStatus,
    #[serde(default)]
    pub execution_history: Vec<ExecutionRecord>,
    #[serde(default)]
    pub last_executed: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub version: u64,
}

fn default_estimated_time() -> u32 {
    DEFAULT_ESTIMATED_TIME
}

impl TestCase {
    pub fn last_execution(&self) -> Option<&ExecutionRecord> {
        self.execution_history.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCaseDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TestCasePriority,
    pub test_type: TestType,
    pub preconditions: String,
    pub test_steps: Vec<String>,
    pub expected_result: String,
    pub assigned_to: String,
    pub estimated_time: u32,
    pub tags: Vec<String>,
}

impl Default for TestCaseDraft {
    fn default() -> Self {
        TestCaseDraft {
            title: String::new(),
            description: String::new(),
            category: String::new(),
            priority: TestCasePriority::default(),
            test_type: TestType::default(),
            preconditions: String::new(),
            test_steps: Vec::new(),
            expected_result: String::new(),
            assigned_to: String::new(),
            estimated_time: DEFAULT_ESTIMATED_TIME,
            tags: Vec::new(),
        }
    }
}

/// Partial update for a test case.
///
/// `estimated_time: Set(0)` is ignored so the stored estimate never drops
/// below [`MIN_ESTIMATED_TIME`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCasePatch {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub category: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub priority: Patch<TestCasePriority>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub test_type: Patch<TestType>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub preconditions: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub test_steps: Patch<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub expected_result: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub assigned_to: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub estimated_time: Patch<u32>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub tags: Patch<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub status: Patch<TestCaseStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub execution_history: Patch<Vec<ExecutionRecord>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub last_executed: Patch<Option<Timestamp>>,
}

impl TestCasePatch {
    /// The write `execute` performs: full history, new status, run time
    pub fn execution(history: Vec<ExecutionRecord>, status: TestCaseStatus, at: Timestamp) -> Self {
        TestCasePatch {
            status: Patch::Set(status),
            execution_history: Patch::Set(history),
            last_executed: Patch::Set(Some(at)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TestCasePatch::default()
    }
}

impl Entity for TestCase {
    type Draft = TestCaseDraft;
    type Patch = TestCasePatch;

    const KIND: EntityKind = EntityKind::TestCase;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn from_draft(id: EntityId, draft: TestCaseDraft, now: Timestamp) -> Self {
        TestCase {
            id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            priority: draft.priority,
            test_type: draft.test_type,
            preconditions: draft.preconditions,
            test_steps: draft.test_steps,
            expected_result: draft.expected_result,
            assigned_to: draft.assigned_to,
            estimated_time: draft.estimated_time.max(MIN_ESTIMATED_TIME),
            tags: draft.tags,
            status: TestCaseStatus::Pending,
            execution_history: Vec::new(),
            last_executed: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn apply_patch(&mut self, patch: TestCasePatch, policy: MergePolicy) {
        let TestCasePatch {
            title,
            description,
            category,
            priority,
            test_type,
            preconditions,
            test_steps,
            expected_result,
            assigned_to,
            estimated_time,
            tags,
            status,
            execution_history,
            last_executed,
        } = patch;

        title.apply_to(&mut self.title, policy);
        description.apply_to(&mut self.description, policy);
        category.apply_to(&mut self.category, policy);
        priority.apply_to(&mut self.priority, policy);
        test_type.apply_to(&mut self.test_type, policy);
        preconditions.apply_to(&mut self.preconditions, policy);
        test_steps.apply_to(&mut self.test_steps, policy);
        expected_result.apply_to(&mut self.expected_result, policy);
        assigned_to.apply_to(&mut self.assigned_to, policy);
        if estimated_time.as_set().is_some_and(|m| *m >= MIN_ESTIMATED_TIME) {
            estimated_time.apply_to(&mut self.estimated_time, policy);
        }
        tags.apply_to(&mut self.tags, policy);
        status.apply_to(&mut self.status, policy);
        execution_history.apply_to(&mut self.execution_history, policy);
        last_executed.apply_to(&mut self.last_executed, policy);
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}

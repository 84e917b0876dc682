use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Deref;

use crate::error::BugHiveError;

pub use jiff::Timestamp;

/// Identifier assigned by the backing store.
///
/// Remote backends hand out numeric ids while the in-memory store uses
/// sequence strings, so ids are kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, when it is one
    pub fn as_seq(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Deref for EntityId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        EntityId(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntityId(s),
            RawId::Number(n) => EntityId(n.to_string()),
        })
    }
}

/// The record collections this system manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Ticket,
    TestCase,
    User,
    Comment,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Ticket => "ticket",
            EntityKind::TestCase => "test case",
            EntityKind::User => "user",
            EntityKind::Comment => "comment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Ticket enums use lowercase spellings.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

crate::enum_display_fromstr!(TicketPriority, BugHiveError::InvalidPriority, {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

pub const VALID_TICKET_PRIORITIES: &[&str] = &["critical", "high", "medium", "low"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    #[serde(rename = "new")]
    New,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "testing")]
    Testing,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "closed")]
    Closed,
}

crate::enum_display_fromstr!(TicketStatus, BugHiveError::InvalidStatus, {
    New => "new",
    InProgress => "in-progress",
    Testing => "testing",
    Resolved => "resolved",
    Closed => "closed",
});

pub const VALID_TICKET_STATUSES: &[&str] =
    &["new", "in-progress", "testing", "resolved", "closed"];

// Test case enums use capitalised spellings and are deliberately separate
// types from the ticket ones.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TestCasePriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

crate::enum_display_fromstr!(TestCasePriority, BugHiveError::InvalidPriority, {
    Critical => "Critical",
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

pub const VALID_TEST_CASE_PRIORITIES: &[&str] = &["Critical", "High", "Medium", "Low"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TestCaseStatus {
    #[default]
    Pending,
    Pass,
    Fail,
    Blocked,
}

crate::enum_display_fromstr!(TestCaseStatus, BugHiveError::InvalidStatus, {
    Pending => "Pending",
    Pass => "Pass",
    Fail => "Fail",
    Blocked => "Blocked",
});

pub const VALID_TEST_CASE_STATUSES: &[&str] = &["Pending", "Pass", "Fail", "Blocked"];

/// Outcome of a single test case run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionResult {
    Pass,
    Fail,
    Blocked,
}

crate::enum_display_fromstr!(ExecutionResult, BugHiveError::InvalidStatus, {
    Pass => "Pass",
    Fail => "Fail",
    Blocked => "Blocked",
});

pub const VALID_EXECUTION_RESULTS: &[&str] = &["Pass", "Fail", "Blocked"];

impl From<ExecutionResult> for TestCaseStatus {
    fn from(result: ExecutionResult) -> Self {
        match result {
            ExecutionResult::Pass => TestCaseStatus::Pass,
            ExecutionResult::Fail => TestCaseStatus::Fail,
            ExecutionResult::Blocked => TestCaseStatus::Blocked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TestType {
    #[default]
    Functional,
    #[serde(rename = "UI Testing")]
    Ui,
    #[serde(rename = "Performance Testing")]
    Performance,
    #[serde(rename = "Security Testing")]
    Security,
    #[serde(rename = "Integration Testing")]
    Integration,
    #[serde(rename = "System Testing")]
    System,
}

crate::enum_display_fromstr!(
    TestType,
    |value| BugHiveError::InvalidValue {
        field: "test type",
        value,
    },
    {
        Functional => "Functional",
        Ui => "UI Testing",
        Performance => "Performance Testing",
        Security => "Security Testing",
        Integration => "Integration Testing",
        System => "System Testing",
    }
);

/// Reference to a user copied by value at the time it was attached.
///
/// Renaming the user later does not update tickets that already hold a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: EntityId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        UserRef {
            id: id.into(),
            name: name.into(),
        }
    }
}

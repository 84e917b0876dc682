//! Partial updates with explicit field presence
//!
//! A [`Patch`] tells "leave this field alone" apart from "set this field to
//! an empty value". The [`MergePolicy`] decides whether blank values are
//! honoured or skipped the way a truthiness-based merge would.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{
    EntityId, ExecutionResult, TestCasePriority, TestCaseStatus, TestType, TicketPriority,
    TicketStatus, Timestamp, UserRef,
};

/// One field of a partial update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field omitted from the update
    #[default]
    Unchanged,
    /// Field present in the update, possibly with an empty value
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unchanged => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unchanged => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Set(value) => Patch::Set(f(value)),
            Patch::Unchanged => Patch::Unchanged,
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Unchanged => serializer.serialize_none(),
        }
    }
}

// Absent fields never reach this impl; they come from `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

/// How blank values in a patch are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Every present field overwrites, including empty strings and `None`
    #[default]
    Explicit,
    /// Present-but-blank fields are ignored (legacy truthiness merge)
    SkipEmpty,
}

/// Values that count as "falsy" under [`MergePolicy::SkipEmpty`]
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for u32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.is_none()
    }
}

macro_rules! never_blank {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Blank for $ty {
                fn is_blank(&self) -> bool {
                    false
                }
            }
        )+
    };
}

never_blank!(
    EntityId,
    UserRef,
    Timestamp,
    TicketPriority,
    TicketStatus,
    TestCasePriority,
    TestCaseStatus,
    TestType,
    ExecutionResult,
);

impl<T: Blank> Patch<T> {
    /// Write the patched value into `target`, returning whether it was written
    pub fn apply_to(self, target: &mut T, policy: MergePolicy) -> bool {
        match self {
            Patch::Unchanged => false,
            Patch::Set(value) if policy == MergePolicy::SkipEmpty && value.is_blank() => false,
            Patch::Set(value) => {
                *target = value;
                true
            }
        }
    }

    /// Whether applying under `policy` would write anything
    pub fn is_effective(&self, policy: MergePolicy) -> bool {
        match self {
            Patch::Unchanged => false,
            Patch::Set(value) => policy == MergePolicy::Explicit || !value.is_blank(),
        }
    }
}

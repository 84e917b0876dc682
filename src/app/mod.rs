//! Page state containers
//!
//! Each page owns its canonical list and changes it only through its reducer,
//! in response to confirmed service results. Nested flows (forms, detail
//! views, the board) never touch the list directly.

pub mod test_case_page;
pub mod ticket_page;

pub use test_case_page::{TestCaseAction, TestCasePage, TestCaseSummary, reduce_test_case_page};
pub use ticket_page::{TicketAction, TicketPage, ViewMode, reduce_ticket_page};

/// Identifies one opening of a detail view or modal.
///
/// Results of calls issued from a session that has since been closed are
/// dropped instead of being applied to stale view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewSession(u64);

impl ViewSession {
    pub fn first() -> Self {
        ViewSession(1)
    }

    pub fn next(self) -> Self {
        ViewSession(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Notice {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Error)
    }
}

/// Whole-list load status. `Failed` replaces the view with a retry prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub mod macros;
pub mod app;
pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod entity;
pub mod error;
pub mod filter;
pub mod form;
pub mod logging;
pub mod patch;
pub mod preferences;
pub mod seed;
pub mod service;
pub mod store;
pub mod types;

pub use app::{TestCasePage, TicketPage, ViewSession};
pub use board::{Board, DragState, MoveIntent};
pub use config::Config;
pub use entity::{Comment, TestCase, Ticket, User};
pub use error::{BugHiveError, Result};
pub use filter::{TestCaseFilters, TicketFilters};
pub use service::Services;
pub use store::{DataClient, MemoryStore, RestClient};
pub use types::{
    EntityId, ExecutionResult, TestCasePriority, TestCaseStatus, TestType, TicketPriority,
    TicketStatus, UserRef,
};

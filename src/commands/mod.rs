//! CLI command implementations
//!
//! Every command opens a [`Workspace`], drives the same services, forms and
//! page reducers an interactive front end would, and prints the result.
//! Mutating commands write the in-memory store back to the seed file.

mod board;
mod comment;
mod test_case;
mod theme;
mod ticket;
mod user;

pub use board::{MoveTarget, cmd_board, cmd_move};
pub use comment::{cmd_comment_add, cmd_comment_ls};
pub use test_case::{
    TestCaseCreateOptions, TestCaseListOptions, TestCaseUpdateOptions, cmd_test_case_create,
    cmd_test_case_delete, cmd_test_case_execute, cmd_test_case_ls, cmd_test_case_show,
    cmd_test_case_update,
};
pub use theme::{cmd_theme_set, cmd_theme_show, cmd_theme_toggle};
pub use ticket::{
    TicketCreateOptions, TicketUpdateOptions, cmd_ticket_assign, cmd_ticket_create,
    cmd_ticket_delete, cmd_ticket_ls, cmd_ticket_show, cmd_ticket_status, cmd_ticket_unassign,
    cmd_ticket_update,
};
pub use user::{cmd_user_create, cmd_user_ls};

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::entity::User;
use crate::error::Result;
use crate::seed::SeedData;
use crate::service::Services;

/// Loaded configuration plus services wired to it
pub struct Workspace {
    pub config: Config,
    pub services: Services,
}

impl Workspace {
    /// Load `bughive.yaml` and, for the memory backend, the seed snapshot
    pub fn open() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let seed = if config.is_memory_backend() {
            SeedData::load(&config.seed_path())?
        } else {
            SeedData::default()
        };
        let services = Services::from_config(&config, seed)?;
        Ok(Workspace { config, services })
    }

    /// Write the in-memory collections back to the seed file. Remote
    /// backends persist on their own and are left alone.
    pub fn persist(&self) -> Result<()> {
        if let Some(snapshot) = self.services.snapshot() {
            let path = self.config.seed_path();
            snapshot.save(&path)?;
            debug!(path = %path.display(), "workspace persisted");
        }
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.services.users.get_all().await
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

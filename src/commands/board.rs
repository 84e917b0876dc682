use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};

use super::ticket::load_page;
use super::{Workspace, print_json};
use crate::app::{TicketAction, reduce_ticket_page};
use crate::board::{Direction, MoveIntent, column_title, commit_move, keyboard_move};
use crate::display::{board_table, format_ticket_line};
use crate::error::{BugHiveError, Result};
use crate::filter::TicketFilters;
use crate::types::{EntityId, EntityKind, TicketStatus};

/// Where `move` sends a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Status(TicketStatus),
    Step(Direction),
}

/// Print the kanban board of the tickets matching `filters`
pub async fn cmd_board(filters: TicketFilters, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let page = reduce_ticket_page(load_page(&ws).await?, TicketAction::FilterChanged(filters));
    let board = page.board();

    if output_json {
        let mut columns = Map::new();
        for (status, tickets) in board.columns() {
            columns.insert(status.to_string(), json!(tickets));
        }
        return print_json(&Value::Object(columns));
    }
    println!("{}", board_table(&board));
    Ok(())
}

/// Move a ticket to another column. Moving to its current column is a no-op.
pub async fn cmd_move(id: &str, target: MoveTarget, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let page = load_page(&ws).await?;
    let id = EntityId::new(id);
    let ticket = page
        .tickets
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| BugHiveError::not_found(EntityKind::Ticket, id.as_str()))?;

    let intent = match target {
        MoveTarget::Status(to) => MoveIntent::new(ticket.id.clone(), ticket.status, to),
        MoveTarget::Step(direction) => keyboard_move(ticket, direction),
    };

    let Some(intent) = intent else {
        if output_json {
            return print_json(ticket);
        }
        println!(
            "Ticket #{} stays in {}",
            ticket.id,
            column_title(ticket.status)
        );
        return Ok(());
    };

    let Some(moved) = commit_move(&intent, &ws.services.tickets).await? else {
        return Ok(());
    };
    ws.persist()?;

    if output_json {
        return print_json(&moved);
    }
    println!(
        "{} {} -> {}: {}",
        "Moved".green(),
        column_title(intent.from),
        column_title(intent.to),
        format_ticket_line(&moved)
    );
    Ok(())
}

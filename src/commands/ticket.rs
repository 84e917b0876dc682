use owo_colors::OwoColorize;
use serde_json::json;
use tracing::warn;

use super::{Workspace, print_json};
use crate::app::ticket_page::load_tickets;
use crate::app::{TicketAction, TicketPage, reduce_ticket_page};
use crate::display::{format_ticket_detail, format_ticket_line, ticket_table};
use crate::entity::Ticket;
use crate::error::{BugHiveError, Result};
use crate::filter::TicketFilters;
use crate::form::{TicketEditForm, TicketWizard};
use crate::types::{EntityId, EntityKind, TicketPriority, TicketStatus};

/// Load the ticket page the way the list view does
pub(super) async fn load_page(ws: &Workspace) -> Result<TicketPage> {
    let page = reduce_ticket_page(TicketPage::new(), TicketAction::LoadStarted);
    let page = reduce_ticket_page(page, load_tickets(&ws.services.tickets).await);
    match page.load.error() {
        Some(message) => Err(BugHiveError::Service(message.to_string())),
        None => Ok(page),
    }
}

fn print_ticket(ticket: &Ticket, verb: &str, output_json: bool) -> Result<()> {
    if output_json {
        print_json(ticket)
    } else {
        println!("{} {}", verb.green(), format_ticket_line(ticket));
        Ok(())
    }
}

/// List tickets matching the filters
pub async fn cmd_ticket_ls(filters: TicketFilters, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let page = reduce_ticket_page(load_page(&ws).await?, TicketAction::FilterChanged(filters));
    let visible = page.visible_tickets();

    if output_json {
        return print_json(&visible);
    }
    if visible.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }
    println!("{}", ticket_table(&visible));
    println!("\n{} ticket(s)", visible.len());
    Ok(())
}

/// Show one ticket with its comments
pub async fn cmd_ticket_show(id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let id = EntityId::new(id);
    let (ticket, comments) = futures::join!(
        ws.services.tickets.get_by_id(&id),
        ws.services.comments.get_by_ticket_id(&id)
    );
    let ticket = ticket?;

    if output_json {
        return print_json(&json!({ "ticket": ticket, "comments": comments }));
    }
    println!("{}", format_ticket_detail(&ticket, &comments));
    Ok(())
}

pub struct TicketCreateOptions {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub assignee: Option<String>,
    pub steps_to_reproduce: String,
    pub expected_behavior: String,
    pub actual_behavior: String,
}

/// Create a ticket through the two-step wizard
pub async fn cmd_ticket_create(options: TicketCreateOptions, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let users = ws.users().await?;

    let mut wizard = TicketWizard::new();
    wizard.title = options.title;
    wizard.description = options.description;
    wizard.priority = Some(options.priority);
    if let Some(assignee) = options.assignee {
        if !users.iter().any(|u| u.id.as_str() == assignee.trim()) {
            warn!(%assignee, "unknown assignee, creating ticket unassigned");
        }
        wizard.assignee_id = assignee;
    }
    if !wizard.next() {
        return Err(BugHiveError::Validation(wizard.errors().clone()));
    }
    wizard.steps_to_reproduce = options.steps_to_reproduce;
    wizard.expected_behavior = options.expected_behavior;
    wizard.actual_behavior = options.actual_behavior;

    let ticket = wizard
        .submit(&ws.services.tickets, &users, ws.services.identity.clone())
        .await?;
    ws.persist()?;
    print_ticket(&ticket, "Created", output_json)
}

#[derive(Default)]
pub struct TicketUpdateOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub assignee: Option<String>,
    pub unassign: bool,
}

/// Edit summary fields of a ticket. Only changed fields are sent.
pub async fn cmd_ticket_update(
    id: &str,
    options: TicketUpdateOptions,
    output_json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let id = EntityId::new(id);
    let ticket = ws.services.tickets.get_by_id(&id).await?;
    let users = ws.users().await?;

    let mut form = TicketEditForm::new(&ticket);
    if let Some(title) = options.title {
        form.title = title;
    }
    if let Some(description) = options.description {
        form.description = description;
    }
    if let Some(priority) = options.priority {
        form.priority = priority;
    }
    if let Some(status) = options.status {
        form.status = status;
    }
    if options.unassign {
        form.assignee_id.clear();
    } else if let Some(assignee) = options.assignee {
        let assignee = EntityId::new(assignee.trim());
        if !users.iter().any(|u| u.id == assignee) {
            return Err(BugHiveError::not_found(EntityKind::User, assignee.as_str()));
        }
        form.assignee_id = assignee.to_string();
    }

    if !form.is_dirty(&users) {
        if output_json {
            return print_json(&ticket);
        }
        println!("Nothing to update for ticket #{}", ticket.id);
        return Ok(());
    }

    let updated = form.submit(&ws.services.tickets, &users).await?;
    ws.persist()?;
    print_ticket(&updated, "Updated", output_json)
}

pub async fn cmd_ticket_status(id: &str, status: TicketStatus, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let ticket = ws
        .services
        .tickets
        .update_status(&EntityId::new(id), status)
        .await?;
    ws.persist()?;
    print_ticket(&ticket, "Updated", output_json)
}

pub async fn cmd_ticket_assign(id: &str, user_id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let ticket = ws
        .services
        .tickets
        .assign_ticket(&EntityId::new(id), &EntityId::new(user_id), &ws.services.users)
        .await?;
    ws.persist()?;
    print_ticket(&ticket, "Assigned", output_json)
}

pub async fn cmd_ticket_unassign(id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let ticket = ws
        .services
        .tickets
        .unassign_ticket(&EntityId::new(id))
        .await?;
    ws.persist()?;
    print_ticket(&ticket, "Unassigned", output_json)
}

pub async fn cmd_ticket_delete(id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let id = EntityId::new(id);
    ws.services.tickets.delete(&id).await?;
    ws.persist()?;

    if output_json {
        return print_json(&json!({ "id": id, "action": "deleted" }));
    }
    println!("{} ticket #{}", "Deleted".green(), id);
    Ok(())
}

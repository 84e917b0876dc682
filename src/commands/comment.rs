use owo_colors::OwoColorize;

use super::{Workspace, print_json};
use crate::display::comment_table;
use crate::entity::CommentDraft;
use crate::error::{BugHiveError, Result};
use crate::form::FieldErrors;
use crate::types::EntityId;

/// List the comments on a ticket, oldest first
pub async fn cmd_comment_ls(ticket_id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let ticket_id = EntityId::new(ticket_id);
    let comments = ws.services.comments.get_by_ticket_id(&ticket_id).await;

    if output_json {
        return print_json(&comments);
    }
    if comments.is_empty() {
        println!("No comments on ticket #{}.", ticket_id);
        return Ok(());
    }
    println!("{}", comment_table(&comments));
    Ok(())
}

/// Comment on an existing ticket as the configured identity
pub async fn cmd_comment_add(ticket_id: &str, content: &str, output_json: bool) -> Result<()> {
    if content.trim().is_empty() {
        let mut errors = FieldErrors::default();
        errors.insert("content", "Comment cannot be empty");
        return Err(BugHiveError::Validation(errors));
    }

    let ws = Workspace::open()?;
    let ticket = ws.services.tickets.get_by_id(&EntityId::new(ticket_id)).await?;
    let comment = ws
        .services
        .comments
        .create(CommentDraft {
            ticket_id: ticket.id.clone(),
            author: Some(ws.services.identity.clone()),
            content: content.trim().to_string(),
        })
        .await?;
    ws.persist()?;

    if output_json {
        return print_json(&comment);
    }
    println!("{} comment {} on ticket #{}", "Added".green(), comment.id.cyan(), ticket.id);
    Ok(())
}

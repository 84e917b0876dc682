//! Table renderings for list and board output

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::board::{Board, column_title};
use crate::entity::{Comment, TestCase, Ticket, User};

const BOARD_CARD_WIDTH: usize = 24;

/// Shorten `text` to at most `max` characters, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// A row in the ticket list table
#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

/// A row in the test case list table
#[derive(Tabled)]
struct TestCaseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assigned To")]
    assigned_to: String,
    #[tabled(rename = "Est. (min)")]
    estimated_time: u32,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Posted")]
    posted: String,
    #[tabled(rename = "Comment")]
    content: String,
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn rounded(mut table: Table) -> String {
    table.with(Style::rounded());
    table.to_string()
}

pub fn ticket_table(tickets: &[&Ticket]) -> String {
    let rows = tickets.iter().map(|t| TicketRow {
        id: t.id.to_string(),
        title: truncate(&t.title, 48),
        priority: t.priority.to_string(),
        status: t.status.to_string(),
        assignee: or_dash(t.assignee_name().unwrap_or_default()),
    });
    rounded(Table::new(rows))
}

pub fn test_case_table(test_cases: &[&TestCase]) -> String {
    let rows = test_cases.iter().map(|tc| TestCaseRow {
        id: tc.id.to_string(),
        title: truncate(&tc.title, 40),
        category: or_dash(&tc.category),
        priority: tc.priority.to_string(),
        status: tc.status.to_string(),
        assigned_to: or_dash(&tc.assigned_to),
        estimated_time: tc.estimated_time,
    });
    rounded(Table::new(rows))
}

pub fn user_table(users: &[User]) -> String {
    let rows = users.iter().map(|u| UserRow {
        id: u.id.to_string(),
        name: u.name.clone(),
        email: or_dash(&u.email),
        role: or_dash(&u.role),
    });
    rounded(Table::new(rows))
}

pub fn comment_table(comments: &[Comment]) -> String {
    let rows = comments.iter().map(|c| CommentRow {
        id: c.id.to_string(),
        author: c
            .author
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "-".to_string()),
        posted: super::format_date(&c.created_at),
        content: truncate(&c.content, 60),
    });
    rounded(Table::new(rows))
}

/// Render the board as one table column per status
pub fn board_table(board: &Board<'_>) -> String {
    let mut builder = Builder::default();
    builder.push_record(
        board
            .columns()
            .map(|(status, tickets)| format!("{} ({})", column_title(status), tickets.len())),
    );

    let depth = board.columns().map(|(_, t)| t.len()).max().unwrap_or(0);
    for row in 0..depth {
        builder.push_record(board.columns().map(|(_, tickets)| {
            tickets
                .get(row)
                .map(|t| truncate(&format!("#{} {}", t.id, t.title), BOARD_CARD_WIDTH))
                .unwrap_or_default()
        }));
    }

    rounded(builder.build())
}

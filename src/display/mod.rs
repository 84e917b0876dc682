use owo_colors::OwoColorize;

use crate::entity::{TestCase, Ticket};
use crate::types::{TestCasePriority, TestCaseStatus, TicketPriority, TicketStatus};

pub mod detail;
pub mod tables;

pub use detail::*;
pub use tables::*;

pub fn format_status_colored(status: TicketStatus) -> String {
    format_status_colored_with_format(status, |s| format!("[{}]", s))
}

pub fn format_status_colored_with_format<F>(status: TicketStatus, format_fn: F) -> String
where
    F: Fn(&str) -> String,
{
    let badge = format_fn(status.as_str());
    match status {
        TicketStatus::New => badge.yellow().to_string(),
        TicketStatus::InProgress => badge.cyan().to_string(),
        TicketStatus::Testing => badge.magenta().to_string(),
        TicketStatus::Resolved => badge.green().to_string(),
        TicketStatus::Closed => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: TicketPriority) -> String {
    let badge = format!("[{}]", priority);
    match priority {
        TicketPriority::Critical => badge.red().bold().to_string(),
        TicketPriority::High => badge.red().to_string(),
        TicketPriority::Medium => badge.yellow().to_string(),
        TicketPriority::Low => badge.dimmed().to_string(),
    }
}

pub fn format_test_status_colored(status: TestCaseStatus) -> String {
    let badge = format!("[{}]", status);
    match status {
        TestCaseStatus::Pending => badge.dimmed().to_string(),
        TestCaseStatus::Pass => badge.green().to_string(),
        TestCaseStatus::Fail => badge.red().to_string(),
        TestCaseStatus::Blocked => badge.yellow().to_string(),
    }
}

pub fn format_test_priority_colored(priority: TestCasePriority) -> String {
    let badge = format!("[{}]", priority);
    match priority {
        TestCasePriority::Critical => badge.red().bold().to_string(),
        TestCasePriority::High => badge.red().to_string(),
        TestCasePriority::Medium => badge.yellow().to_string(),
        TestCasePriority::Low => badge.dimmed().to_string(),
    }
}

/// Format a ticket for single-line display with colors
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id_padded = format!("{:6}", ticket.id.as_str());
    let assignee = ticket
        .assignee_name()
        .map(|name| format!(" @{}", name))
        .unwrap_or_default();
    format!(
        "{} {}{} - {}{}",
        id_padded.cyan(),
        format_priority_colored(ticket.priority),
        format_status_colored(ticket.status),
        ticket.title,
        assignee.dimmed()
    )
}

/// Format a test case for single-line display with colors
pub fn format_test_case_line(test_case: &TestCase) -> String {
    let id_padded = format!("{:6}", test_case.id.as_str());
    format!(
        "{} {}{} - {} ({})",
        id_padded.cyan(),
        format_test_priority_colored(test_case.priority),
        format_test_status_colored(test_case.status),
        test_case.title,
        test_case.category
    )
}

use owo_colors::OwoColorize;

use super::{
    format_priority_colored, format_status_colored, format_test_priority_colored,
    format_test_status_colored,
};
use crate::entity::{Comment, TestCase, Ticket};
use crate::types::Timestamp;

/// Date part (YYYY-MM-DD) of a timestamp
pub fn format_date(timestamp: &Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d").to_string()
}

/// Date and minute (YYYY-MM-DD HH:MM, UTC) of a timestamp
pub fn format_datetime(timestamp: &Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M").to_string()
}

fn section(output: &mut String, title: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    output.push_str(&format!("\n\n{}\n{}", format!("## {}", title).bold(), body.trim()));
}

/// Full ticket view with reproduction details and comments
pub fn format_ticket_detail(ticket: &Ticket, comments: &[Comment]) -> String {
    let mut output = format!(
        "{} {}\n{} {}",
        format!("#{}", ticket.id).cyan(),
        ticket.title.bold(),
        format_priority_colored(ticket.priority),
        format_status_colored(ticket.status),
    );

    let assignee = ticket.assignee_name().unwrap_or("Unassigned");
    let reporter = ticket
        .reporter
        .as_ref()
        .map(|r| r.name.as_str())
        .unwrap_or("-");
    output.push_str(&format!(
        "\nAssignee: {}  Reporter: {}\nCreated: {}  Updated: {}",
        assignee,
        reporter,
        format_datetime(&ticket.created_at),
        format_datetime(&ticket.updated_at),
    ));

    section(&mut output, "Description", &ticket.description);
    section(&mut output, "Steps to Reproduce", &ticket.steps_to_reproduce);
    section(&mut output, "Expected Behavior", &ticket.expected_behavior);
    section(&mut output, "Actual Behavior", &ticket.actual_behavior);

    if !comments.is_empty() {
        let body: Vec<String> = comments
            .iter()
            .map(|c| {
                let author = c.author.as_ref().map(|a| a.name.as_str()).unwrap_or("-");
                format!("- {} ({}): {}", author, format_date(&c.created_at), c.content)
            })
            .collect();
        section(&mut output, "Comments", &body.join("\n"));
    }

    output
}

/// Full test case view including execution history, newest first
pub fn format_test_case_detail(test_case: &TestCase) -> String {
    let mut output = format!(
        "{} {}\n{} {} {}",
        format!("#{}", test_case.id).cyan(),
        test_case.title.bold(),
        format_test_priority_colored(test_case.priority),
        format_test_status_colored(test_case.status),
        test_case.test_type,
    );

    output.push_str(&format!(
        "\nCategory: {}  Assigned to: {}  Estimate: {} min",
        if test_case.category.is_empty() {
            "-"
        } else {
            test_case.category.as_str()
        },
        test_case.assigned_to,
        test_case.estimated_time,
    ));
    if !test_case.tags.is_empty() {
        output.push_str(&format!("\nTags: {}", test_case.tags.join(", ")));
    }

    section(&mut output, "Description", &test_case.description);
    section(&mut output, "Preconditions", &test_case.preconditions);

    let steps: Vec<String> = test_case
        .test_steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();
    section(&mut output, "Steps", &steps.join("\n"));
    section(&mut output, "Expected Result", &test_case.expected_result);

    let history: Vec<String> = test_case
        .execution_history
        .iter()
        .rev()
        .map(|run| {
            let notes = run
                .notes
                .as_deref()
                .map(|n| format!(" - {}", n))
                .unwrap_or_default();
            format!(
                "- {} {} by {}{}",
                format_datetime(&run.executed_at),
                format_test_status_colored(run.result.into()),
                run.executed_by,
                notes
            )
        })
        .collect();
    section(&mut output, "Execution History", &history.join("\n"));

    output
}

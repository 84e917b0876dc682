use bughive::entity::{Entity, TestCase, TestCaseDraft, Ticket, TicketDraft};
use bughive::filter::{TestCaseFilters, TicketFilters, filter_test_cases, filter_tickets};
use bughive::types::{
    EntityId, TestCasePriority, TestCaseStatus, TicketPriority, TicketStatus, Timestamp, UserRef,
};

fn tickets() -> Vec<Ticket> {
    let rows = [
        ("Login fails on Safari", TicketPriority::Critical, TicketStatus::New, Some("Ada")),
        ("Export to CSV is slow", TicketPriority::Low, TicketStatus::Testing, None),
        ("login button misaligned", TicketPriority::Medium, TicketStatus::New, Some("Grace")),
        ("Crash when saving", TicketPriority::Critical, TicketStatus::Closed, Some("adam")),
        ("Password reset email", TicketPriority::High, TicketStatus::Resolved, None),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (title, priority, status, assignee))| {
            Ticket::from_draft(
                EntityId::from(i as u64 + 1),
                TicketDraft {
                    title: title.to_string(),
                    description: format!("Reported against {title}"),
                    priority,
                    status,
                    assignee: assignee.map(|name| UserRef::new(name.to_lowercase(), name)),
                    ..Default::default()
                },
                Timestamp::UNIX_EPOCH,
            )
        })
        .collect()
}

fn ticket_filter_grid() -> Vec<TicketFilters> {
    let mut grid = Vec::new();
    for priority in [None, Some(TicketPriority::Critical), Some(TicketPriority::Low)] {
        for status in [None, Some(TicketStatus::New), Some(TicketStatus::Closed)] {
            for assignee in ["", "ad", "nobody"] {
                for search in ["", "LOGIN", "csv"] {
                    grid.push(TicketFilters {
                        priority,
                        status,
                        assignee: assignee.to_string(),
                        search: search.to_string(),
                    });
                }
            }
        }
    }
    grid
}

/// Whether `sub` appears in `full` in the same relative order
fn is_subsequence(sub: &[&Ticket], full: &[Ticket]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|s| rest.any(|t| t.id == s.id))
}

#[test]
fn test_ticket_filters_yield_ordered_subsequence() {
    let tickets = tickets();
    for filters in ticket_filter_grid() {
        let filtered = filter_tickets(&tickets, &filters);
        assert!(is_subsequence(&filtered, &tickets), "{filters:?}");
    }
}

#[test]
fn test_ticket_filters_are_idempotent() {
    let tickets = tickets();
    for filters in ticket_filter_grid() {
        let once: Vec<Ticket> = filter_tickets(&tickets, &filters)
            .into_iter()
            .cloned()
            .collect();
        let twice = filter_tickets(&once, &filters);
        assert_eq!(twice.len(), once.len(), "{filters:?}");
    }
}

#[test]
fn test_combined_ticket_filters() {
    let tickets = tickets();
    let filters = TicketFilters {
        priority: Some(TicketPriority::Critical),
        assignee: "AD".to_string(),
        ..Default::default()
    };
    let titles: Vec<_> = filter_tickets(&tickets, &filters)
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Login fails on Safari", "Crash when saving"]);
}

fn test_cases() -> Vec<TestCase> {
    let rows = [
        ("Login with SSO", "Auth", TestCasePriority::High, TestCaseStatus::Pass, vec!["sso"]),
        ("Checkout totals", "Payments", TestCasePriority::Critical, TestCaseStatus::Fail, vec![]),
        ("Refund flow", "payments", TestCasePriority::Medium, TestCaseStatus::Pending, vec!["money"]),
        ("Session timeout", "Auth", TestCasePriority::Low, TestCaseStatus::Blocked, vec!["login"]),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (title, category, priority, status, tags))| {
            let mut tc = TestCase::from_draft(
                EntityId::from(i as u64 + 1),
                TestCaseDraft {
                    title: title.to_string(),
                    category: category.to_string(),
                    priority,
                    tags: tags.into_iter().map(String::from).collect(),
                    ..Default::default()
                },
                Timestamp::UNIX_EPOCH,
            );
            tc.status = status;
            tc
        })
        .collect()
}

#[test]
fn test_test_case_search_covers_tags_and_category() {
    let cases = test_cases();
    let search = |text: &str| -> Vec<String> {
        let filters = TestCaseFilters {
            search: text.to_string(),
            ..Default::default()
        };
        filter_test_cases(&cases, &filters)
            .iter()
            .map(|tc| tc.id.to_string())
            .collect()
    };
    assert_eq!(search("login"), vec!["1", "4"]);
    assert_eq!(search("PAYMENTS"), vec!["2", "3"]);
    assert_eq!(search("money"), vec!["3"]);
    assert!(search("nothing matches").is_empty());
}

#[test]
fn test_test_case_category_is_exact() {
    let cases = test_cases();
    let mut filters = TestCaseFilters::default();
    filters.set_category("payments");
    let found = filter_test_cases(&cases, &filters);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Refund flow");

    filters.set_category(" Payments ");
    assert_eq!(filter_test_cases(&cases, &filters).len(), 1);

    filters.set_category("Pay");
    assert!(filter_test_cases(&cases, &filters).is_empty());

    filters.set_category("All");
    assert_eq!(filters.category, None);
    assert_eq!(filter_test_cases(&cases, &filters).len(), 4);
}

#[test]
fn test_test_case_status_and_priority() {
    let cases = test_cases();
    let filters = TestCaseFilters {
        status: Some(TestCaseStatus::Fail),
        priority: Some(TestCasePriority::Critical),
        ..Default::default()
    };
    let found = filter_test_cases(&cases, &filters);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Checkout totals");
}

//! Filter/search reducers for ticket and test case lists
//!
//! Filtering is pure and keeps the input order: the result is always a
//! subsequence of the input, and applying the same filters again changes
//! nothing. Text predicates are case-insensitive substring matches; an empty
//! text predicate or an unset choice matches everything.

use std::str::FromStr;

use unicase::UniCase;

use crate::entity::{TestCase, Ticket};
use crate::error::Result;
use crate::types::{TestCasePriority, TestCaseStatus, TicketPriority, TicketStatus};

/// Label for "no restriction" in choice filters
pub const ALL: &str = "All";

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack_folded = UniCase::new(haystack).to_folded_case();
    let needle_folded = UniCase::new(needle).to_folded_case();
    haystack_folded.contains(&needle_folded)
}

/// Parse a choice filter value. Blank and `All` clear the filter.
pub fn parse_choice<T: FromStr<Err = crate::error::BugHiveError>>(value: &str) -> Result<Option<T>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilters {
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    /// Substring of the assignee's name
    pub assignee: String,
    /// Substring of title or description
    pub search: String,
}

impl TicketFilters {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.status.is_none()
            && self.assignee.trim().is_empty()
            && self.search.trim().is_empty()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }

        let assignee = self.assignee.trim();
        if !assignee.is_empty() {
            // Unassigned tickets never match a non-empty assignee filter
            match ticket.assignee_name() {
                Some(name) if contains_case_insensitive(name, assignee) => {}
                _ => return false,
            }
        }

        let search = self.search.trim();
        search.is_empty()
            || contains_case_insensitive(&ticket.title, search)
            || contains_case_insensitive(&ticket.description, search)
    }
}

pub fn filter_tickets<'a>(tickets: &'a [Ticket], filters: &TicketFilters) -> Vec<&'a Ticket> {
    tickets.iter().filter(|t| filters.matches(t)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseFilters {
    /// Substring of title, description, category or any tag
    pub search: String,
    pub status: Option<TestCaseStatus>,
    pub priority: Option<TestCasePriority>,
    /// Exact category, compared case-insensitively
    pub category: Option<String>,
}

impl TestCaseFilters {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
    }

    /// Set the category filter from a picker value, where `All` clears it
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.category = if category.is_empty() || category.eq_ignore_ascii_case(ALL) {
            None
        } else {
            Some(category.to_string())
        };
    }

    pub fn matches(&self, test_case: &TestCase) -> bool {
        if self.status.is_some_and(|s| s != test_case.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != test_case.priority) {
            return false;
        }
        if let Some(category) = &self.category
            && category.as_str() != test_case.category.trim()
        {
            return false;
        }

        let search = self.search.trim();
        search.is_empty()
            || contains_case_insensitive(&test_case.title, search)
            || contains_case_insensitive(&test_case.description, search)
            || contains_case_insensitive(&test_case.category, search)
            || test_case
                .tags
                .iter()
                .any(|tag| contains_case_insensitive(tag, search))
    }
}

pub fn filter_test_cases<'a>(
    test_cases: &'a [TestCase],
    filters: &TestCaseFilters,
) -> Vec<&'a TestCase> {
    test_cases.iter().filter(|tc| filters.matches(tc)).collect()
}

/// Category picker options: `All`, then each distinct non-blank category in
/// first-seen order
pub fn categories(test_cases: &[TestCase]) -> Vec<String> {
    let mut result = vec![ALL.to_string()];
    for test_case in test_cases {
        let category = test_case.category.trim();
        if !category.is_empty() && !result[1..].iter().any(|c| c == category) {
            result.push(category.to_string());
        }
    }
    result
}

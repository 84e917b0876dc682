use owo_colors::OwoColorize;
use serde_json::json;

use super::{Workspace, print_json};
use crate::app::test_case_page::{load_test_cases, settle_detail};
use crate::app::{TestCaseAction, TestCasePage, reduce_test_case_page};
use crate::display::{format_test_case_detail, format_test_case_line, test_case_table};
use crate::entity::TestCase;
use crate::error::{BugHiveError, Result};
use crate::filter::TestCaseFilters;
use crate::form::{TestCaseDetail, TestCaseForm, parse_tags};
use crate::types::{EntityId, EntityKind, ExecutionResult, TestCasePriority, TestType};

async fn load_page(ws: &Workspace) -> Result<TestCasePage> {
    let page = reduce_test_case_page(TestCasePage::new(), TestCaseAction::LoadStarted);
    let page = reduce_test_case_page(page, load_test_cases(&ws.services.test_cases).await);
    match page.load.error() {
        Some(message) => Err(BugHiveError::Service(message.to_string())),
        None => Ok(page),
    }
}

/// Open the detail view for `id` on a freshly loaded page
async fn open_detail(ws: &Workspace, id: &str) -> Result<(TestCasePage, TestCaseDetail)> {
    let id = EntityId::new(id);
    let page = reduce_test_case_page(load_page(ws).await?, TestCaseAction::OpenDetail(id.clone()));
    let detail = page
        .detail()
        .cloned()
        .ok_or_else(|| BugHiveError::not_found(EntityKind::TestCase, id.as_str()))?;
    Ok((page, detail))
}

/// Run the detail's pending sub-flow and fold the outcome into the page
async fn settle(
    ws: &Workspace,
    page: TestCasePage,
    detail: TestCaseDetail,
) -> Result<TestCasePage> {
    let page = reduce_test_case_page(page, TestCaseAction::DetailChanged(detail.clone()));
    let executed_by = ws.services.identity.name.clone();
    match settle_detail(detail, &ws.services.test_cases, &executed_by).await {
        Some(TestCaseAction::ServiceFailed(message)) => Err(BugHiveError::Service(message)),
        Some(TestCaseAction::DetailChanged(detail)) => {
            Err(BugHiveError::Validation(detail.errors().clone()))
        }
        Some(action) => Ok(reduce_test_case_page(page, action)),
        None => Ok(page),
    }
}

fn print_test_case(test_case: &TestCase, verb: &str, output_json: bool) -> Result<()> {
    if output_json {
        print_json(test_case)
    } else {
        println!("{} {}", verb.green(), format_test_case_line(test_case));
        Ok(())
    }
}

#[derive(Default)]
pub struct TestCaseListOptions {
    pub filters: TestCaseFilters,
    pub category: Option<String>,
}

/// List test cases with the status summary
pub async fn cmd_test_case_ls(options: TestCaseListOptions, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let mut filters = options.filters;
    if let Some(category) = options.category {
        filters.set_category(&category);
    }
    let page = reduce_test_case_page(load_page(&ws).await?, TestCaseAction::FilterChanged(filters));
    let visible = page.visible_test_cases();
    let summary = page.summary();

    if output_json {
        return print_json(&json!({
            "testCases": visible,
            "summary": {
                "total": summary.total,
                "pending": summary.pending,
                "pass": summary.pass,
                "fail": summary.fail,
                "blocked": summary.blocked,
            },
            "categories": page.categories(),
        }));
    }

    if visible.is_empty() {
        println!("No test cases found.");
    } else {
        println!("{}", test_case_table(&visible));
    }
    println!(
        "\n{} total: {} pending, {} pass, {} fail, {} blocked",
        summary.total,
        summary.pending,
        summary.pass.green(),
        summary.fail.red(),
        summary.blocked.yellow()
    );
    Ok(())
}

pub async fn cmd_test_case_show(id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let test_case = ws.services.test_cases.get_by_id(&EntityId::new(id)).await?;
    if output_json {
        return print_json(&test_case);
    }
    println!("{}", format_test_case_detail(&test_case));
    Ok(())
}

pub struct TestCaseCreateOptions {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TestCasePriority,
    pub test_type: TestType,
    pub preconditions: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub assigned_to: String,
    pub estimated_time: u32,
    pub tags: Option<String>,
}

pub async fn cmd_test_case_create(options: TestCaseCreateOptions, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;

    let mut form = TestCaseForm::new();
    form.title = options.title;
    form.description = options.description;
    form.category = options.category;
    form.priority = options.priority;
    form.test_type = options.test_type;
    form.preconditions = options.preconditions;
    form.set_steps(options.steps);
    form.expected_result = options.expected_result;
    form.assigned_to = options.assigned_to;
    form.estimated_time = options.estimated_time;
    form.tags = options.tags.unwrap_or_default();

    let test_case = form.submit(&ws.services.test_cases).await?;
    ws.persist()?;
    print_test_case(&test_case, "Created", output_json)
}

/// Record one execution of a test case
pub async fn cmd_test_case_execute(
    id: &str,
    result: ExecutionResult,
    notes: Option<String>,
    output_json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let (page, mut detail) = open_detail(&ws, id).await?;
    detail.begin_execute();
    detail.set_execution(result, notes.unwrap_or_default());

    let page = settle(&ws, page, detail).await?;
    ws.persist()?;
    let Some(detail) = page.detail() else {
        return Ok(());
    };
    print_test_case(detail.canonical(), "Executed", output_json)
}

#[derive(Default)]
pub struct TestCaseUpdateOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<TestCasePriority>,
    pub test_type: Option<TestType>,
    pub preconditions: Option<String>,
    pub steps: Option<Vec<String>>,
    pub expected_result: Option<String>,
    pub assigned_to: Option<String>,
    pub estimated_time: Option<u32>,
    pub tags: Option<String>,
}

/// Edit a test case through the detail view's edit flow
pub async fn cmd_test_case_update(
    id: &str,
    options: TestCaseUpdateOptions,
    output_json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let (page, mut detail) = open_detail(&ws, id).await?;
    detail.begin_edit();
    if let Some(draft) = detail.draft_mut() {
        if let Some(title) = options.title {
            draft.title = title;
        }
        if let Some(description) = options.description {
            draft.description = description;
        }
        if let Some(category) = options.category {
            draft.category = category;
        }
        if let Some(priority) = options.priority {
            draft.priority = priority;
        }
        if let Some(test_type) = options.test_type {
            draft.test_type = test_type;
        }
        if let Some(preconditions) = options.preconditions {
            draft.preconditions = preconditions;
        }
        if let Some(steps) = options.steps {
            draft.test_steps = crate::entity::clean_list(steps);
        }
        if let Some(expected_result) = options.expected_result {
            draft.expected_result = expected_result;
        }
        if let Some(assigned_to) = options.assigned_to {
            draft.assigned_to = assigned_to;
        }
        if let Some(estimated_time) = options.estimated_time {
            draft.estimated_time = estimated_time;
        }
        if let Some(tags) = options.tags {
            draft.tags = parse_tags(&tags);
        }
    }

    let page = settle(&ws, page, detail).await?;
    ws.persist()?;
    let Some(detail) = page.detail() else {
        return Ok(());
    };
    print_test_case(detail.canonical(), "Updated", output_json)
}

/// Delete a test case through the confirm-then-delete flow
pub async fn cmd_test_case_delete(id: &str, output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let (page, mut detail) = open_detail(&ws, id).await?;
    let id = detail.id().clone();
    detail.request_delete();

    settle(&ws, page, detail).await?;
    ws.persist()?;

    if output_json {
        return print_json(&json!({ "id": id, "action": "deleted" }));
    }
    println!("{} test case #{}", "Deleted".green(), id);
    Ok(())
}

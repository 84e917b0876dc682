mod common;

use std::sync::Arc;

use bughive::app::test_case_page::{load_test_cases, settle_detail};
use bughive::app::{TestCaseAction, TestCasePage, reduce_test_case_page};
use bughive::form::DetailMode;
use bughive::service::Services;
use bughive::types::{ExecutionResult, TestCaseStatus};
use common::test_case_draft;

async fn loaded_page(services: &Services) -> TestCasePage {
    for (title, category) in [("Login", "Auth"), ("Checkout", "Payments"), ("Logout", "auth")] {
        services
            .test_cases
            .create(test_case_draft(title, category))
            .await
            .unwrap();
    }
    let page = reduce_test_case_page(TestCasePage::new(), TestCaseAction::LoadStarted);
    reduce_test_case_page(page, load_test_cases(&services.test_cases).await)
}

#[tokio::test]
async fn test_execute_from_detail_updates_list_and_summary() {
    let services = Services::in_memory();
    let page = loaded_page(&services).await;
    let id = page.test_cases[1].id.clone();

    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(id.clone()));
    let mut detail = page.detail().cloned().unwrap();
    detail.begin_execute();
    detail.set_execution(ExecutionResult::Blocked, "env down");
    let page = reduce_test_case_page(page, TestCaseAction::DetailChanged(detail.clone()));

    let action = settle_detail(detail, &services.test_cases, "QA Lead")
        .await
        .unwrap();
    let page = reduce_test_case_page(page, action);

    let detail = page.detail().unwrap();
    assert_eq!(detail.mode(), &DetailMode::Viewing);
    assert_eq!(detail.canonical().status, TestCaseStatus::Blocked);
    let record = detail.canonical().last_execution().unwrap();
    assert_eq!(record.notes.as_deref(), Some("env down"));
    assert_eq!(record.executed_by, "QA Lead");

    assert_eq!(page.test_cases[1].status, TestCaseStatus::Blocked);
    let summary = page.summary();
    assert_eq!((summary.total, summary.pending, summary.blocked), (3, 2, 1));
}

#[tokio::test]
async fn test_result_for_closed_view_does_not_reopen_it() {
    let services = Services::in_memory();
    let page = loaded_page(&services).await;
    let first = page.test_cases[0].id.clone();
    let second = page.test_cases[2].id.clone();

    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(first.clone()));
    let mut stale = page.detail().cloned().unwrap();
    stale.begin_execute();

    // The user moves on to another test case before the call returns
    let page = reduce_test_case_page(page, TestCaseAction::CloseDetail);
    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(second.clone()));
    let mut current = page.detail().cloned().unwrap();
    current.begin_edit();
    let page = reduce_test_case_page(page, TestCaseAction::DetailChanged(current));

    let action = settle_detail(stale, &services.test_cases, "qa").await.unwrap();
    let page = reduce_test_case_page(page, action);

    // The list reflects the confirmed run, the open view is untouched
    assert_eq!(page.test_cases[0].status, TestCaseStatus::Pass);
    let detail = page.detail().unwrap();
    assert_eq!(detail.id(), &second);
    assert!(matches!(detail.mode(), DetailMode::Editing(_)));
}

#[tokio::test]
async fn test_invalid_edit_keeps_draft_and_skips_service() {
    let services = Services::in_memory();
    let page = loaded_page(&services).await;
    let id = page.test_cases[0].id.clone();
    let version = page.test_cases[0].version;

    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(id.clone()));
    let mut detail = page.detail().cloned().unwrap();
    detail.begin_edit();
    detail.draft_mut().unwrap().title = "   ".to_string();
    detail.draft_mut().unwrap().estimated_time = 0;

    let action = settle_detail(detail, &services.test_cases, "qa").await.unwrap();
    let TestCaseAction::DetailChanged(detail) = &action else {
        panic!("expected validation errors, got {action:?}");
    };
    assert!(detail.errors().contains("title"));
    assert!(detail.errors().contains("estimatedTime"));
    assert!(matches!(detail.mode(), DetailMode::Editing(_)));

    let stored = services.test_cases.get_by_id(&id).await.unwrap();
    assert_eq!(stored.version, version);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let services = Services::in_memory();
    let page = loaded_page(&services).await;
    let id = page.test_cases[2].id.clone();

    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(id.clone()));
    let viewing = page.detail().cloned().unwrap();
    assert_eq!(settle_detail(viewing, &services.test_cases, "qa").await, None);
    assert!(services.test_cases.get_by_id(&id).await.is_ok());

    let mut confirming = page.detail().cloned().unwrap();
    confirming.request_delete();
    let action = settle_detail(confirming, &services.test_cases, "qa").await.unwrap();
    let page = reduce_test_case_page(page, action);

    assert!(page.detail().is_none());
    assert_eq!(page.test_cases.len(), 2);
    assert!(
        services
            .test_cases
            .get_by_id(&id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_executions_from_two_views() {
    let services = Arc::new(Services::in_memory());
    let page = loaded_page(&services).await;
    let id = page.test_cases[0].id.clone();

    let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(id.clone()));
    let mut a = page.detail().cloned().unwrap();
    let mut b = a.clone();
    a.begin_execute();
    a.set_execution(ExecutionResult::Pass, "");
    b.begin_execute();
    b.set_execution(ExecutionResult::Fail, "flaky");

    let (ra, rb) = tokio::join!(
        settle_detail(a, &services.test_cases, "alice"),
        settle_detail(b, &services.test_cases, "bob")
    );
    assert!(matches!(ra, Some(TestCaseAction::Executed { .. })));
    assert!(matches!(rb, Some(TestCaseAction::Executed { .. })));

    let stored = services.test_cases.get_by_id(&id).await.unwrap();
    let runners: Vec<_> = stored
        .execution_history
        .iter()
        .map(|r| r.executed_by.as_str())
        .collect();
    assert_eq!(runners.len(), 2);
    assert!(runners.contains(&"alice") && runners.contains(&"bob"));
}

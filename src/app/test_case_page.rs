use tracing::warn;

use super::{LoadState, Notice, ViewSession};
use crate::entity::TestCase;
use crate::filter::{TestCaseFilters, categories, filter_test_cases};
use crate::form::{DetailMode, TestCaseDetail};
use crate::service::TestCaseService;
use crate::store::DataClient;
use crate::types::{EntityId, TestCaseStatus};

/// Status counts over the whole list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCaseSummary {
    pub total: usize,
    pub pending: usize,
    pub pass: usize,
    pub fail: usize,
    pub blocked: usize,
}

impl TestCaseSummary {
    pub fn of(test_cases: &[TestCase]) -> Self {
        let mut summary = TestCaseSummary {
            total: test_cases.len(),
            ..Default::default()
        };
        for test_case in test_cases {
            match test_case.status {
                TestCaseStatus::Pending => summary.pending += 1,
                TestCaseStatus::Pass => summary.pass += 1,
                TestCaseStatus::Fail => summary.fail += 1,
                TestCaseStatus::Blocked => summary.blocked += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestCasePage {
    pub test_cases: Vec<TestCase>,
    pub filters: TestCaseFilters,
    pub load: LoadState,
    pub notice: Option<Notice>,
    detail: Option<TestCaseDetail>,
    last_session: Option<ViewSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestCaseAction {
    LoadStarted,
    Loaded(Vec<TestCase>),
    LoadFailed(String),
    Created(TestCase),
    /// Confirmed edit, issued from the detail view opened as `session`
    Updated {
        test_case: TestCase,
        session: Option<ViewSession>,
    },
    Executed {
        test_case: TestCase,
        session: Option<ViewSession>,
    },
    Deleted(EntityId),
    OpenDetail(EntityId),
    CloseDetail,
    /// Local change to the open detail view (mode switch, draft edit, errors)
    DetailChanged(TestCaseDetail),
    FilterChanged(TestCaseFilters),
    ServiceFailed(String),
    DismissNotice,
}

impl TestCasePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_test_cases(&self) -> Vec<&TestCase> {
        filter_test_cases(&self.test_cases, &self.filters)
    }

    pub fn summary(&self) -> TestCaseSummary {
        TestCaseSummary::of(&self.test_cases)
    }

    /// Category filter options
    pub fn categories(&self) -> Vec<String> {
        categories(&self.test_cases)
    }

    pub fn detail(&self) -> Option<&TestCaseDetail> {
        self.detail.as_ref()
    }

    fn is_open(&self, session: Option<ViewSession>) -> bool {
        session.is_some_and(|s| self.detail.as_ref().is_some_and(|d| d.session() == s))
    }

    fn replace(&mut self, test_case: &TestCase) {
        if let Some(slot) = self.test_cases.iter_mut().find(|tc| tc.id == test_case.id) {
            *slot = test_case.clone();
        }
    }

    /// Apply a confirmed record to the list and to the matching detail view
    fn apply_confirmed(&mut self, test_case: TestCase, session: Option<ViewSession>) {
        self.replace(&test_case);
        let own = self.is_open(session);
        if let Some(detail) = &mut self.detail {
            if own {
                detail.settle(test_case);
            } else {
                detail.refresh(test_case);
            }
        }
    }
}

/// Pure function: apply action to state (reducer pattern)
pub fn reduce_test_case_page(mut state: TestCasePage, action: TestCaseAction) -> TestCasePage {
    match action {
        TestCaseAction::LoadStarted => {
            state.load = LoadState::Loading;
        }
        TestCaseAction::Loaded(test_cases) => {
            state.test_cases = test_cases;
            state.load = LoadState::Loaded;
        }
        TestCaseAction::LoadFailed(message) => {
            state.test_cases.clear();
            state.detail = None;
            state.load = LoadState::Failed(message);
        }
        TestCaseAction::Created(test_case) => {
            match state.test_cases.iter_mut().find(|t| t.id == test_case.id) {
                Some(slot) if slot.version < test_case.version => *slot = test_case,
                Some(_) => {}
                None => state.test_cases.push(test_case),
            }
            state.notice = Some(Notice::success("Test case created"));
        }
        TestCaseAction::Updated { test_case, session } => {
            state.apply_confirmed(test_case, session);
        }
        TestCaseAction::Executed { test_case, session } => {
            let status = test_case.status;
            state.apply_confirmed(test_case, session);
            state.notice = Some(Notice::success(format!("Execution recorded: {status}")));
        }
        TestCaseAction::Deleted(id) => {
            state.test_cases.retain(|tc| tc.id != id);
            if state.detail.as_ref().is_some_and(|d| d.id() == &id) {
                state.detail = None;
            }
            state.notice = Some(Notice::success("Test case deleted"));
        }
        TestCaseAction::OpenDetail(id) => {
            if let Some(test_case) = state.test_cases.iter().find(|tc| tc.id == id).cloned() {
                let session = state
                    .last_session
                    .map(ViewSession::next)
                    .unwrap_or_else(ViewSession::first);
                state.last_session = Some(session);
                state.detail = Some(TestCaseDetail::new(test_case, session));
            }
        }
        TestCaseAction::CloseDetail => {
            state.detail = None;
        }
        TestCaseAction::DetailChanged(detail) => {
            if state.is_open(Some(detail.session())) {
                state.detail = Some(detail);
            }
        }
        TestCaseAction::FilterChanged(filters) => {
            state.filters = filters;
        }
        TestCaseAction::ServiceFailed(message) => {
            state.notice = Some(Notice::error(message));
        }
        TestCaseAction::DismissNotice => {
            state.notice = None;
        }
    }
    state
}

pub async fn load_test_cases<C: DataClient<TestCase>>(
    test_cases: &TestCaseService<C>,
) -> TestCaseAction {
    match test_cases.get_all().await {
        Ok(list) => TestCaseAction::Loaded(list),
        Err(err) => {
            warn!(error = %err, "failed to load test cases");
            TestCaseAction::LoadFailed(err.to_string())
        }
    }
}

/// Run whichever sub-flow `detail` has pending and report the outcome.
///
/// Validation failures come back as `DetailChanged` carrying the field
/// errors; a detail that is only viewing yields `None`.
pub async fn settle_detail<C: DataClient<TestCase>>(
    mut detail: TestCaseDetail,
    test_cases: &TestCaseService<C>,
    executed_by: &str,
) -> Option<TestCaseAction> {
    let session = Some(detail.session());
    let outcome = if matches!(detail.mode(), DetailMode::Editing(_)) {
        detail
            .save_edit(test_cases)
            .await
            .map(|saved| saved.map(|test_case| TestCaseAction::Updated { test_case, session }))
    } else if detail.mode() == &DetailMode::ConfirmingDelete {
        detail
            .confirm_delete(test_cases)
            .await
            .map(|deleted| deleted.map(TestCaseAction::Deleted))
    } else if matches!(detail.mode(), DetailMode::Executing { .. }) {
        detail
            .confirm_execute(test_cases, executed_by)
            .await
            .map(|run| run.map(|test_case| TestCaseAction::Executed { test_case, session }))
    } else {
        return None;
    };

    match outcome {
        Ok(action) => action,
        Err(err) if err.field_errors().is_some() => Some(TestCaseAction::DetailChanged(detail)),
        Err(err) => {
            warn!(id = %detail.id(), error = %err, "test case action failed");
            Some(TestCaseAction::ServiceFailed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, TestCaseDraft};
    use crate::service::Services;
    use crate::types::{ExecutionResult, Timestamp};

    fn test_case(id: &str, category: &str, status: TestCaseStatus) -> TestCase {
        let mut tc = TestCase::from_draft(
            EntityId::new(id),
            TestCaseDraft {
                title: format!("case {id}"),
                category: category.to_string(),
                ..Default::default()
            },
            Timestamp::UNIX_EPOCH,
        );
        tc.status = status;
        tc
    }

    fn loaded() -> TestCasePage {
        reduce_test_case_page(
            TestCasePage::new(),
            TestCaseAction::Loaded(vec![
                test_case("1", "Auth", TestCaseStatus::Pass),
                test_case("2", "Billing", TestCaseStatus::Fail),
                test_case("3", "Auth", TestCaseStatus::Pending),
            ]),
        )
    }

    #[test]
    fn test_created_is_appended() {
        let page = reduce_test_case_page(
            loaded(),
            TestCaseAction::Created(test_case("4", "Search", TestCaseStatus::Pending)),
        );
        assert_eq!(page.test_cases.last().map(|tc| tc.id.as_str()), Some("4"));
    }

    #[test]
    fn test_created_already_loaded_is_not_duplicated() {
        let page = reduce_test_case_page(
            loaded(),
            TestCaseAction::Created(test_case("2", "Billing", TestCaseStatus::Pending)),
        );
        assert_eq!(page.test_cases.len(), 3);
        assert_eq!(page.test_cases[1].status, TestCaseStatus::Fail);
    }

    #[test]
    fn test_summary_and_categories() {
        let page = loaded();
        assert_eq!(
            page.summary(),
            TestCaseSummary {
                total: 3,
                pending: 1,
                pass: 1,
                fail: 1,
                blocked: 0,
            }
        );
        assert_eq!(page.categories(), vec!["All", "Auth", "Billing"]);
    }

    #[test]
    fn test_deleted_closes_detail() {
        let page = reduce_test_case_page(loaded(), TestCaseAction::OpenDetail(EntityId::new("2")));
        assert!(page.detail().is_some());
        let page = reduce_test_case_page(page, TestCaseAction::Deleted(EntityId::new("2")));
        assert!(page.detail().is_none());
        assert_eq!(page.test_cases.len(), 2);
    }

    #[test]
    fn test_stale_result_updates_list_only() {
        let page = reduce_test_case_page(loaded(), TestCaseAction::OpenDetail(EntityId::new("1")));
        let stale = page.detail().map(TestCaseDetail::session);
        let page = reduce_test_case_page(page, TestCaseAction::CloseDetail);
        let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(EntityId::new("3")));

        let mut executed = test_case("1", "Auth", TestCaseStatus::Blocked);
        executed.version = 2;
        let page = reduce_test_case_page(
            page,
            TestCaseAction::Executed {
                test_case: executed,
                session: stale,
            },
        );
        assert_eq!(page.test_cases[0].status, TestCaseStatus::Blocked);
        assert_eq!(page.detail().map(|d| d.id().as_str()), Some("3"));
    }

    #[test]
    fn test_detail_changed_from_closed_session_is_ignored() {
        let page = reduce_test_case_page(loaded(), TestCaseAction::OpenDetail(EntityId::new("1")));
        let mut old = page.detail().cloned().unwrap();
        old.begin_edit();
        let page = reduce_test_case_page(page, TestCaseAction::CloseDetail);
        let page = reduce_test_case_page(page, TestCaseAction::DetailChanged(old));
        assert!(page.detail().is_none());
    }

    #[tokio::test]
    async fn test_execute_through_page() {
        let services = Services::in_memory();
        let created = services
            .test_cases
            .create(TestCaseDraft {
                title: "Login works".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let page = reduce_test_case_page(TestCasePage::new(), load_test_cases(&services.test_cases).await);
        let page = reduce_test_case_page(page, TestCaseAction::OpenDetail(created.id.clone()));

        let mut detail = page.detail().cloned().unwrap();
        detail.begin_execute();
        detail.set_execution(ExecutionResult::Fail, "button disabled");
        let page = reduce_test_case_page(page, TestCaseAction::DetailChanged(detail.clone()));

        let action = settle_detail(detail, &services.test_cases, "qa1")
            .await
            .unwrap();
        let page = reduce_test_case_page(page, action);

        assert_eq!(page.test_cases[0].status, TestCaseStatus::Fail);
        let detail = page.detail().unwrap();
        assert_eq!(detail.mode(), &DetailMode::Viewing);
        assert_eq!(detail.canonical().execution_history.len(), 1);
    }

    #[tokio::test]
    async fn test_settle_viewing_detail_is_noop() {
        let services = Services::in_memory();
        let detail = TestCaseDetail::new(
            test_case("1", "Auth", TestCaseStatus::Pending),
            ViewSession::first(),
        );
        assert!(settle_detail(detail, &services.test_cases, "qa1").await.is_none());
    }
}

//! Test case detail sub-flows: edit, delete, execute
//!
//! The detail view holds the canonical record and replaces it only with
//! what the service confirms. Nothing is applied optimistically.

use super::{FieldErrors, require};
use crate::app::ViewSession;
use crate::entity::test_case::MIN_ESTIMATED_TIME;
use crate::entity::{TestCase, TestCasePatch};
use crate::error::Result;
use crate::patch::Patch;
use crate::service::TestCaseService;
use crate::store::DataClient;
use crate::types::{EntityId, ExecutionResult};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailMode {
    Viewing,
    /// Local copy being edited; the canonical record is untouched
    Editing(Box<TestCase>),
    ConfirmingDelete,
    Executing {
        result: ExecutionResult,
        notes: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseDetail {
    canonical: TestCase,
    mode: DetailMode,
    session: ViewSession,
    errors: FieldErrors,
}

/// Changed editable fields between `draft` and `canonical`
fn edit_patch(canonical: &TestCase, draft: &TestCase) -> TestCasePatch {
    fn diff<T: Clone + PartialEq>(old: &T, new: &T) -> Patch<T> {
        if old == new {
            Patch::Unchanged
        } else {
            Patch::Set(new.clone())
        }
    }

    TestCasePatch {
        title: diff(&canonical.title, &draft.title),
        description: diff(&canonical.description, &draft.description),
        category: diff(&canonical.category, &draft.category),
        priority: diff(&canonical.priority, &draft.priority),
        test_type: diff(&canonical.test_type, &draft.test_type),
        preconditions: diff(&canonical.preconditions, &draft.preconditions),
        test_steps: diff(&canonical.test_steps, &draft.test_steps),
        expected_result: diff(&canonical.expected_result, &draft.expected_result),
        assigned_to: diff(&canonical.assigned_to, &draft.assigned_to),
        estimated_time: diff(&canonical.estimated_time, &draft.estimated_time),
        tags: diff(&canonical.tags, &draft.tags),
        ..Default::default()
    }
}

impl TestCaseDetail {
    pub fn new(test_case: TestCase, session: ViewSession) -> Self {
        TestCaseDetail {
            canonical: test_case,
            mode: DetailMode::Viewing,
            session,
            errors: FieldErrors::default(),
        }
    }

    pub fn canonical(&self) -> &TestCase {
        &self.canonical
    }

    pub fn id(&self) -> &EntityId {
        &self.canonical.id
    }

    pub fn mode(&self) -> &DetailMode {
        &self.mode
    }

    pub fn session(&self) -> ViewSession {
        self.session
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Replace the canonical record with a confirmed one from elsewhere,
    /// leaving any open sub-form alone
    pub fn refresh(&mut self, test_case: TestCase) {
        if test_case.id == self.canonical.id {
            self.canonical = test_case;
        }
    }

    /// Apply the confirmed result of this view's own call and close the
    /// sub-form it came from
    pub fn settle(&mut self, test_case: TestCase) {
        if test_case.id == self.canonical.id {
            self.canonical = test_case;
            self.mode = DetailMode::Viewing;
            self.errors.clear();
        }
    }

    pub fn begin_edit(&mut self) {
        self.errors.clear();
        self.mode = DetailMode::Editing(Box::new(self.canonical.clone()));
    }

    /// The edit draft, while editing
    pub fn draft_mut(&mut self) -> Option<&mut TestCase> {
        match &mut self.mode {
            DetailMode::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Discard the draft; the canonical values are shown again
    pub fn cancel_edit(&mut self) {
        if matches!(self.mode, DetailMode::Editing(_)) {
            self.mode = DetailMode::Viewing;
            self.errors.clear();
        }
    }

    fn validate_draft(draft: &TestCase) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &draft.title, "Title is required");
        if draft.estimated_time < MIN_ESTIMATED_TIME {
            errors.insert("estimatedTime", "Estimated time must be at least 1 minute");
        }
        errors
    }

    /// Send the edit. Returns `Ok(None)` when not editing.
    ///
    /// On success the confirmed record becomes canonical and editing ends;
    /// on failure the draft is kept for another attempt.
    pub async fn save_edit<C: DataClient<TestCase>>(
        &mut self,
        service: &TestCaseService<C>,
    ) -> Result<Option<TestCase>> {
        let DetailMode::Editing(draft) = &self.mode else {
            return Ok(None);
        };

        let errors = Self::validate_draft(draft);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return errors.into_result().map(|_| None);
        }

        let patch = edit_patch(&self.canonical, draft);
        let updated = if patch.is_empty() {
            self.canonical.clone()
        } else {
            service.update(&self.canonical.id, patch).await?
        };

        self.canonical = updated.clone();
        self.mode = DetailMode::Viewing;
        self.errors.clear();
        Ok(Some(updated))
    }

    pub fn request_delete(&mut self) {
        self.mode = DetailMode::ConfirmingDelete;
    }

    pub fn cancel_delete(&mut self) {
        if self.mode == DetailMode::ConfirmingDelete {
            self.mode = DetailMode::Viewing;
        }
    }

    /// Delete after confirmation. Returns the deleted id, or `None` when no
    /// confirmation was pending (no call is made).
    pub async fn confirm_delete<C: DataClient<TestCase>>(
        &mut self,
        service: &TestCaseService<C>,
    ) -> Result<Option<EntityId>> {
        if self.mode != DetailMode::ConfirmingDelete {
            return Ok(None);
        }
        service.delete(&self.canonical.id).await?;
        self.mode = DetailMode::Viewing;
        Ok(Some(self.canonical.id.clone()))
    }

    pub fn begin_execute(&mut self) {
        self.mode = DetailMode::Executing {
            result: ExecutionResult::Pass,
            notes: String::new(),
        };
    }

    pub fn set_execution(&mut self, result: ExecutionResult, notes: impl Into<String>) {
        if let DetailMode::Executing {
            result: current,
            notes: current_notes,
        } = &mut self.mode
        {
            *current = result;
            *current_notes = notes.into();
        }
    }

    pub fn cancel_execute(&mut self) {
        if matches!(self.mode, DetailMode::Executing { .. }) {
            self.mode = DetailMode::Viewing;
        }
    }

    /// Run the pending execution. Returns `Ok(None)` when the execute
    /// sub-form is not open.
    pub async fn confirm_execute<C: DataClient<TestCase>>(
        &mut self,
        service: &TestCaseService<C>,
        executed_by: &str,
    ) -> Result<Option<TestCase>> {
        let DetailMode::Executing { result, notes } = &self.mode else {
            return Ok(None);
        };
        let notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());

        let updated = service
            .execute(&self.canonical.id, *result, notes, executed_by)
            .await?;
        self.canonical = updated.clone();
        self.mode = DetailMode::Viewing;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TestCaseDraft;
    use crate::service::Services;
    use crate::types::TestCaseStatus;

    async fn open(services: &Services) -> TestCaseDetail {
        let tc = services
            .test_cases
            .create(TestCaseDraft {
                title: "Password reset".to_string(),
                description: "Reset link arrives".to_string(),
                expected_result: "Email received".to_string(),
                assigned_to: "qa2".to_string(),
                test_steps: vec!["Request reset".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        TestCaseDetail::new(tc, ViewSession::first())
    }

    #[tokio::test]
    async fn test_cancel_edit_reverts() {
        let services = Services::in_memory();
        let mut detail = open(&services).await;
        detail.begin_edit();
        detail.draft_mut().unwrap().title = "Changed".to_string();
        detail.cancel_edit();
        assert_eq!(detail.mode(), &DetailMode::Viewing);
        assert_eq!(detail.canonical().title, "Password reset");
    }

    #[tokio::test]
    async fn test_save_edit_replaces_canonical() {
        let services = Services::in_memory();
        let mut detail = open(&services).await;
        detail.begin_edit();
        detail.draft_mut().unwrap().title = "Password reset by email".to_string();
        let saved = detail.save_edit(&services.test_cases).await.unwrap().unwrap();
        assert_eq!(saved.title, "Password reset by email");
        assert_eq!(detail.canonical().version, 2);
        assert_eq!(detail.mode(), &DetailMode::Viewing);
    }

    #[tokio::test]
    async fn test_save_edit_blank_title_keeps_editing() {
        let services = Services::in_memory();
        let mut detail = open(&services).await;
        detail.begin_edit();
        detail.draft_mut().unwrap().title = " ".to_string();
        assert!(detail.save_edit(&services.test_cases).await.is_err());
        assert!(matches!(detail.mode(), DetailMode::Editing(_)));
        assert_eq!(detail.errors().get("title"), Some("Title is required"));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let services = Services::in_memory();
        let mut detail = open(&services).await;
        assert_eq!(detail.confirm_delete(&services.test_cases).await.unwrap(), None);
        assert_eq!(services.test_cases.get_all().await.unwrap().len(), 1);

        detail.request_delete();
        let deleted = detail.confirm_delete(&services.test_cases).await.unwrap();
        assert_eq!(deleted.as_ref(), Some(detail.id()));
        assert!(services.test_cases.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_flow() {
        let services = Services::in_memory();
        let mut detail = open(&services).await;
        detail.begin_execute();
        detail.set_execution(ExecutionResult::Blocked, "SMTP down");
        let updated = detail
            .confirm_execute(&services.test_cases, "qa2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TestCaseStatus::Blocked);
        assert_eq!(detail.canonical().execution_history.len(), 1);
        assert_eq!(detail.mode(), &DetailMode::Viewing);
    }
}

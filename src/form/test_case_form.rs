use tracing::warn;

use super::{FieldErrors, SubmitState, require};
use crate::entity::test_case::{DEFAULT_ESTIMATED_TIME, MIN_ESTIMATED_TIME};
use crate::entity::{TestCase, TestCaseDraft, clean_list};
use crate::error::Result;
use crate::service::TestCaseService;
use crate::store::DataClient;
use crate::types::{TestCasePriority, TestType};

/// Single-screen test case creation form with an editable step list
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseForm {
    state: SubmitState,
    errors: FieldErrors,
    steps: Vec<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TestCasePriority,
    pub test_type: TestType,
    pub preconditions: String,
    pub expected_result: String,
    pub assigned_to: String,
    pub estimated_time: u32,
    /// Comma-separated tag input
    pub tags: String,
}

impl Default for TestCaseForm {
    fn default() -> Self {
        TestCaseForm {
            state: SubmitState::Idle,
            errors: FieldErrors::default(),
            steps: vec![String::new()],
            title: String::new(),
            description: String::new(),
            category: String::new(),
            priority: TestCasePriority::Medium,
            test_type: TestType::Functional,
            preconditions: String::new(),
            expected_result: String::new(),
            assigned_to: String::new(),
            estimated_time: DEFAULT_ESTIMATED_TIME,
            tags: String::new(),
        }
    }
}

/// Split comma-separated tags, trimming and dropping blanks and repeats
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in clean_list(input.split(',')) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl TestCaseForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn add_step(&mut self) {
        self.steps.push(String::new());
    }

    /// Remove a step row. The last remaining row is never removed.
    pub fn remove_step(&mut self, index: usize) -> bool {
        if self.steps.len() > 1 && index < self.steps.len() {
            self.steps.remove(index);
            true
        } else {
            false
        }
    }

    pub fn set_step(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.steps.get_mut(index) {
            Some(step) => {
                *step = text.into();
                true
            }
            None => false,
        }
    }

    /// Replace every step row; an empty list leaves one blank row
    pub fn set_steps<I, S>(&mut self, steps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        if self.steps.is_empty() {
            self.steps.push(String::new());
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "description", &self.description, "Description is required");
        require(
            &mut errors,
            "expectedResult",
            &self.expected_result,
            "Expected result is required",
        );
        require(&mut errors, "assignedTo", &self.assigned_to, "Assigned to is required");
        if self.estimated_time < MIN_ESTIMATED_TIME {
            errors.insert("estimatedTime", "Estimated time must be at least 1 minute");
        }
        if self.steps.iter().all(|s| s.trim().is_empty()) {
            errors.insert("testSteps", "At least one test step is required");
        }
        errors
    }

    /// Validated draft with blank steps removed and tags parsed
    pub fn draft(&self) -> Result<TestCaseDraft> {
        self.validate().into_result()?;
        Ok(TestCaseDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            priority: self.priority,
            test_type: self.test_type,
            preconditions: self.preconditions.trim().to_string(),
            test_steps: clean_list(&self.steps),
            expected_result: self.expected_result.trim().to_string(),
            assigned_to: self.assigned_to.trim().to_string(),
            estimated_time: self.estimated_time,
            tags: parse_tags(&self.tags),
        })
    }

    /// Create the test case, resetting the form on success and keeping
    /// every value on failure
    pub async fn submit<C: DataClient<TestCase>>(
        &mut self,
        test_cases: &TestCaseService<C>,
    ) -> Result<TestCase> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(err) => {
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                }
                return Err(err);
            }
        };

        self.errors.clear();
        self.state = SubmitState::Submitting;
        match test_cases.create(draft).await {
            Ok(test_case) => {
                *self = Self::default();
                Ok(test_case)
            }
            Err(err) => {
                warn!(error = %err, "test case creation failed");
                self.state = SubmitState::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

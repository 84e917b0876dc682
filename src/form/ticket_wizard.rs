//! Two-step ticket creation wizard
//!
//! Step one collects the summary (title, description, priority, assignee),
//! step two the reproduction details. Each forward transition is gated on
//! its step's fields; going back clears errors but keeps every value.

use tracing::warn;

use super::{FieldErrors, require};
use crate::entity::{Ticket, TicketDraft, User};
use crate::error::{BugHiveError, Result};
use crate::service::TicketService;
use crate::store::DataClient;
use crate::types::{EntityId, TicketPriority, TicketStatus, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Basic,
    Details,
}

impl WizardStep {
    /// One-based position
    pub fn number(self) -> usize {
        match self {
            WizardStep::Basic => 1,
            WizardStep::Details => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Basic => "Basic Information",
            WizardStep::Details => "Technical Details",
        }
    }

    pub fn progress(self) -> u8 {
        match self {
            WizardStep::Basic => 50,
            WizardStep::Details => 100,
        }
    }
}

pub const WIZARD_STEPS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    /// Last attempt failed; fields are intact and submit may be retried
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketWizard {
    step: WizardStep,
    state: SubmitState,
    errors: FieldErrors,
    pub title: String,
    pub description: String,
    pub priority: Option<TicketPriority>,
    /// Selected user id, empty for unassigned
    pub assignee_id: String,
    pub steps_to_reproduce: String,
    pub expected_behavior: String,
    pub actual_behavior: String,
}

impl Default for TicketWizard {
    fn default() -> Self {
        TicketWizard {
            step: WizardStep::Basic,
            state: SubmitState::Idle,
            errors: FieldErrors::default(),
            title: String::new(),
            description: String::new(),
            priority: Some(TicketPriority::Medium),
            assignee_id: String::new(),
            steps_to_reproduce: String::new(),
            expected_behavior: String::new(),
            actual_behavior: String::new(),
        }
    }
}

impl TicketWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Set priority from a picker value; blank clears it
    pub fn set_priority(&mut self, value: &str) -> Result<()> {
        self.priority = if value.trim().is_empty() {
            None
        } else {
            Some(value.parse()?)
        };
        Ok(())
    }

    fn validate_basic(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "description", &self.description, "Description is required");
        if self.priority.is_none() {
            errors.insert("priority", "Priority is required");
        }
        errors
    }

    fn validate_details(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(
            &mut errors,
            "stepsToReproduce",
            &self.steps_to_reproduce,
            "Steps to reproduce are required",
        );
        require(
            &mut errors,
            "expectedBehavior",
            &self.expected_behavior,
            "Expected behavior is required",
        );
        require(
            &mut errors,
            "actualBehavior",
            &self.actual_behavior,
            "Actual behavior is required",
        );
        errors
    }

    /// Advance to the details step. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        if self.step == WizardStep::Details {
            return false;
        }
        self.errors = self.validate_basic();
        if self.errors.is_empty() {
            self.step = WizardStep::Details;
            true
        } else {
            false
        }
    }

    /// Return to the first step, clearing errors and keeping values
    pub fn back(&mut self) {
        self.step = WizardStep::Basic;
        self.errors.clear();
    }

    /// Discard everything, as closing the dialog does
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate both steps and build the draft that would be submitted
    pub fn draft(&self, users: &[User], reporter: UserRef) -> Result<TicketDraft> {
        let basic = self.validate_basic();
        if !basic.is_empty() {
            return Err(BugHiveError::Validation(basic));
        }
        self.validate_details().into_result()?;

        let assignee_id = EntityId::new(self.assignee_id.trim());
        let assignee = users
            .iter()
            .find(|u| !assignee_id.is_empty() && u.id == assignee_id)
            .map(User::as_user_ref);

        Ok(TicketDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority.unwrap_or_default(),
            status: TicketStatus::New,
            assignee,
            reporter: Some(reporter),
            steps_to_reproduce: self.steps_to_reproduce.trim().to_string(),
            expected_behavior: self.expected_behavior.trim().to_string(),
            actual_behavior: self.actual_behavior.trim().to_string(),
            attachments: Vec::new(),
        })
    }

    /// Create the ticket.
    ///
    /// Only the details step submits. From step one this validates and
    /// advances without calling the service.
    ///
    /// Validation failures never reach the service; a first-step failure
    /// moves the wizard back to step one. On success the wizard resets. On a
    /// service failure the wizard stays on the details step with every value
    /// intact and the state records the message.
    pub async fn submit<C: DataClient<Ticket>>(
        &mut self,
        tickets: &TicketService<C>,
        users: &[User],
        reporter: UserRef,
    ) -> Result<Ticket> {
        if self.step != WizardStep::Details {
            // Submitting from step one only advances, like pressing Next
            if !self.next() {
                return Err(BugHiveError::Validation(self.errors.clone()));
            }
            let mut errors = FieldErrors::default();
            errors.insert("step", "Review the technical details before submitting");
            return Err(BugHiveError::Validation(errors));
        }

        let draft = match self.draft(users, reporter) {
            Ok(draft) => draft,
            Err(err) => {
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                    if !self.validate_basic().is_empty() {
                        self.step = WizardStep::Basic;
                    }
                }
                return Err(err);
            }
        };

        self.errors.clear();
        self.state = SubmitState::Submitting;
        match tickets.create(draft).await {
            Ok(ticket) => {
                self.reset();
                Ok(ticket)
            }
            Err(err) => {
                warn!(error = %err, "ticket creation failed");
                self.state = SubmitState::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

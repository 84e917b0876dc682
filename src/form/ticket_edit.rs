use super::{FieldErrors, require};
use crate::entity::{Ticket, TicketPatch, User};
use crate::error::Result;
use crate::patch::Patch;
use crate::service::TicketService;
use crate::store::DataClient;
use crate::types::{EntityId, TicketPriority, TicketStatus};

/// Edit form for an existing ticket's summary fields
#[derive(Debug, Clone, PartialEq)]
pub struct TicketEditForm {
    original: Ticket,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    /// Selected user id, empty for unassigned
    pub assignee_id: String,
}

impl TicketEditForm {
    pub fn new(ticket: &Ticket) -> Self {
        TicketEditForm {
            original: ticket.clone(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            priority: ticket.priority,
            status: ticket.status,
            assignee_id: ticket
                .assignee
                .as_ref()
                .map(|a| a.id.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn original(&self) -> &Ticket {
        &self.original
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &self.title, "Title is required");
        errors
    }

    /// Only the fields that differ from the ticket the form was opened on.
    ///
    /// A selected assignee that is not in `users` clears the assignment.
    pub fn patch(&self, users: &[User]) -> TicketPatch {
        let mut patch = TicketPatch::default();
        let original = &self.original;

        if self.title != original.title {
            patch.title = Patch::Set(self.title.clone());
        }
        if self.description != original.description {
            patch.description = Patch::Set(self.description.clone());
        }
        if self.priority != original.priority {
            patch.priority = Patch::Set(self.priority);
        }
        if self.status != original.status {
            patch.status = Patch::Set(self.status);
        }

        let selected = EntityId::new(self.assignee_id.trim());
        let assignee = if selected.is_empty() {
            None
        } else {
            users
                .iter()
                .find(|u| u.id == selected)
                .map(User::as_user_ref)
        };
        if assignee != original.assignee {
            patch.assignee = Patch::Set(assignee);
        }

        patch
    }

    pub fn is_dirty(&self, users: &[User]) -> bool {
        !self.patch(users).is_empty()
    }

    /// Validate and send one update. An unchanged form returns the original
    /// ticket without calling the service.
    pub async fn submit<C: DataClient<Ticket>>(
        &self,
        tickets: &TicketService<C>,
        users: &[User],
    ) -> Result<Ticket> {
        self.validate().into_result()?;
        let patch = self.patch(users);
        if patch.is_empty() {
            return Ok(self.original.clone());
        }
        tickets.update(&self.original.id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, TicketDraft, UserDraft};
    use crate::service::Services;
    use crate::types::{Timestamp, UserRef};

    fn user(id: &str, name: &str) -> User {
        User::from_draft(
            EntityId::new(id),
            UserDraft {
                name: name.to_string(),
                ..Default::default()
            },
            Timestamp::UNIX_EPOCH,
        )
    }

    fn ticket() -> Ticket {
        Ticket::from_draft(
            EntityId::new("1"),
            TicketDraft {
                title: "Flaky upload".to_string(),
                assignee: Some(UserRef::new("u1", "Ada")),
                ..Default::default()
            },
            Timestamp::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_unchanged_form_is_empty_patch() {
        let users = vec![user("u1", "Ada")];
        let form = TicketEditForm::new(&ticket());
        assert!(!form.is_dirty(&users));
    }

    #[test]
    fn test_only_changed_fields() {
        let users = vec![user("u1", "Ada"), user("u2", "Grace")];
        let mut form = TicketEditForm::new(&ticket());
        form.status = TicketStatus::Testing;
        form.assignee_id = "u2".to_string();
        let patch = form.patch(&users);
        assert_eq!(patch.status, Patch::Set(TicketStatus::Testing));
        assert_eq!(patch.assignee, Patch::Set(Some(UserRef::new("u2", "Grace"))));
        assert!(patch.title.is_unchanged());
        assert!(patch.priority.is_unchanged());
    }

    #[test]
    fn test_unknown_assignee_clears() {
        let mut form = TicketEditForm::new(&ticket());
        form.assignee_id = "ghost".to_string();
        assert_eq!(form.patch(&[]).assignee, Patch::Set(None));
    }

    #[tokio::test]
    async fn test_submit_blank_title_is_rejected() {
        let services = Services::in_memory();
        let created = services
            .tickets
            .create(TicketDraft {
                title: "Flaky upload".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut form = TicketEditForm::new(&created);
        form.title = "   ".to_string();
        let err = form.submit(&services.tickets, &[]).await.unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.get("title")),
            Some("Title is required")
        );

        form.title = "Flaky upload on Safari".to_string();
        let updated = form.submit(&services.tickets, &[]).await.unwrap();
        assert_eq!(updated.title, "Flaky upload on Safari");
        assert_eq!(updated.version, 2);
    }
}

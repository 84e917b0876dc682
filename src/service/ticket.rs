use tracing::info;

use super::EntityService;
use crate::entity::{Ticket, TicketPatch, User};
use crate::error::Result;
use crate::store::DataClient;
use crate::types::{EntityId, TicketStatus};

impl<C: DataClient<Ticket>> EntityService<Ticket, C> {
    pub async fn update_status(&self, id: &EntityId, status: TicketStatus) -> Result<Ticket> {
        let ticket = self.update(id, TicketPatch::status(status)).await?;
        info!(%id, %status, "ticket status changed");
        Ok(ticket)
    }

    /// Assign the ticket to an existing user.
    ///
    /// The user is looked up first so the stored reference carries the real
    /// name; an unknown user id fails with `NotFound` and leaves the ticket
    /// untouched.
    pub async fn assign_ticket<U: DataClient<User>>(
        &self,
        id: &EntityId,
        assignee_id: &EntityId,
        users: &EntityService<User, U>,
    ) -> Result<Ticket> {
        let user = users.get_by_id(assignee_id).await?;
        let ticket = self
            .update(id, TicketPatch::assignee(Some(user.as_user_ref())))
            .await?;
        info!(%id, assignee = %user.name, "ticket assigned");
        Ok(ticket)
    }

    pub async fn unassign_ticket(&self, id: &EntityId) -> Result<Ticket> {
        self.update(id, TicketPatch::assignee(None)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::{TicketDraft, UserDraft};
    use crate::service::Services;
    use crate::types::{EntityId, EntityKind, TicketStatus};

    async fn setup() -> (Services, EntityId) {
        let services = Services::in_memory();
        let ticket = services
            .tickets
            .create(TicketDraft {
                title: "Search returns nothing".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        (services, ticket.id)
    }

    #[tokio::test]
    async fn test_update_status() {
        let (services, id) = setup().await;
        let ticket = services
            .tickets
            .update_status(&id, TicketStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Resolved);
    }

    #[tokio::test]
    async fn test_assign_resolves_user() {
        let (services, id) = setup().await;
        let user = services
            .users
            .create(UserDraft {
                name: "Grace Hopper".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let ticket = services
            .tickets
            .assign_ticket(&id, &user.id, &services.users)
            .await
            .unwrap();
        assert_eq!(ticket.assignee_name(), Some("Grace Hopper"));

        let ticket = services.tickets.unassign_ticket(&id).await.unwrap();
        assert!(ticket.assignee.is_none());
    }

    #[tokio::test]
    async fn test_assign_unknown_user_fails() {
        let (services, id) = setup().await;
        let err = services
            .tickets
            .assign_ticket(&id, &EntityId::new("999"), &services.users)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::BugHiveError::NotFound { kind: EntityKind::User, .. }
        ));
        let ticket = services.tickets.get_by_id(&id).await.unwrap();
        assert_eq!(ticket.version, 1);
    }
}

use tracing::warn;

use super::EntityService;
use crate::entity::Comment;
use crate::store::DataClient;
use crate::types::EntityId;

impl<C: DataClient<Comment>> EntityService<Comment, C> {
    /// Comments on one ticket, oldest first.
    ///
    /// Comments are secondary to the ticket view, so a backend failure is
    /// logged and reads as "no comments" instead of failing the caller.
    pub async fn get_by_ticket_id(&self, ticket_id: &EntityId) -> Vec<Comment> {
        match self.client.fetch_all().await {
            Ok(comments) => comments
                .into_iter()
                .filter(|c| &c.ticket_id == ticket_id)
                .collect(),
            Err(err) => {
                warn!(%ticket_id, error = %err, "failed to load comments");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::CommentDraft;
    use crate::service::Services;
    use crate::types::EntityId;

    #[tokio::test]
    async fn test_get_by_ticket_id_filters() {
        let services = Services::in_memory();
        for (ticket, content) in [("1", "first"), ("2", "other"), ("1", "second")] {
            services
                .comments
                .create(CommentDraft {
                    ticket_id: EntityId::new(ticket),
                    author: Some(services.identity.clone()),
                    content: content.to_string(),
                })
                .await
                .unwrap();
        }

        let comments = services
            .comments
            .get_by_ticket_id(&EntityId::new("1"))
            .await;
        let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);

        assert!(
            services
                .comments
                .get_by_ticket_id(&EntityId::new("3"))
                .await
                .is_empty()
        );
    }
}

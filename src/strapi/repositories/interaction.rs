//! Post interaction repository implementation

use crate::models::{CreateInteractionRequest, InteractionKind, PostInteraction};
use crate::strapi::{Query, StrapiClient};
use crate::utils::errors::Result;

const COLLECTION: &str = "post-interactions";

#[derive(Clone, Debug)]
pub struct InteractionRepository {
    client: StrapiClient,
}

impl InteractionRepository {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    /// Interactions of one kind by a user on a post
    pub async fn find(&self, user_id: u64, post_id: u64, kind: InteractionKind) -> Result<Vec<PostInteraction>> {
        let query = Query::new()
            .relation_eq("user", "id", user_id)
            .relation_eq("post", "id", post_id)
            .eq("kind", kind.as_str());
        self.client.find(COLLECTION, &query).await
    }

    /// Number of interactions of one kind on a post
    pub async fn count(&self, post_id: u64, kind: InteractionKind) -> Result<u64> {
        let query = Query::new()
            .relation_eq("post", "id", post_id)
            .eq("kind", kind.as_str());
        self.client.count(COLLECTION, &query).await
    }

    pub async fn create(&self, request: CreateInteractionRequest) -> Result<PostInteraction> {
        self.client.create(COLLECTION, &request, &Query::new()).await
    }

    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.client.delete(COLLECTION, document_id).await
    }
}

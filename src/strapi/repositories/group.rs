//! Instructor group repository implementation

use crate::models::{CreateGroupRequest, InstructorGroup, UpdateGroupRequest};
use crate::strapi::{Query, StrapiClient};
use crate::utils::errors::Result;

const COLLECTION: &str = "instructor-groups";

#[derive(Clone, Debug)]
pub struct GroupRepository {
    client: StrapiClient,
}

impl GroupRepository {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    fn populated() -> Query {
        Query::new().populate("owner").populate("instructors")
    }

    /// Create a new group
    pub async fn create(&self, request: CreateGroupRequest) -> Result<InstructorGroup> {
        self.client.create(COLLECTION, &request, &Self::populated()).await
    }

    /// Find group by numeric ID
    pub async fn find_by_id(&self, id: u64) -> Result<Option<InstructorGroup>> {
        let query = Self::populated().eq("id", id);
        let groups = self.client.find::<InstructorGroup>(COLLECTION, &query).await?;
        Ok(groups.into_iter().next())
    }

    /// Find group by document ID
    pub async fn find_by_document_id(&self, document_id: &str) -> Result<Option<InstructorGroup>> {
        self.client.find_one(COLLECTION, document_id, &Self::populated()).await
    }

    /// Groups owned by a user
    pub async fn find_owned_by(&self, user_id: u64) -> Result<Vec<InstructorGroup>> {
        let query = Self::populated().relation_eq("owner", "id", user_id);
        self.client.find_all(COLLECTION, &query).await
    }

    /// Groups containing any of the given instructors
    pub async fn find_with_members(&self, instructor_ids: &[u64]) -> Result<Vec<InstructorGroup>> {
        if instructor_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Self::populated().relation_in("instructors", "id", instructor_ids);
        self.client.find_all(COLLECTION, &query).await
    }

    /// Update group
    pub async fn update(&self, document_id: &str, request: UpdateGroupRequest) -> Result<InstructorGroup> {
        self.client
            .update(COLLECTION, document_id, &request, &Self::populated())
            .await
    }

    /// Delete group
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.client.delete(COLLECTION, document_id).await
    }
}

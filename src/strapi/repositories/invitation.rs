//! Instructor invitation repository implementation

use crate::models::{CreateInvitationRequest, InstructorInvitation, InvitationStatus, UpdateInvitationRequest};
use crate::strapi::{Query, StrapiClient};
use crate::utils::errors::Result;

const COLLECTION: &str = "instructor-invitations";

#[derive(Clone, Debug)]
pub struct InvitationRepository {
    client: StrapiClient,
}

impl InvitationRepository {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    fn populated() -> Query {
        Query::new()
            .populate("from_user")
            .populate("to_instructor")
            .populate("instructor_group")
    }

    /// Create a new invitation
    pub async fn create(&self, request: CreateInvitationRequest) -> Result<InstructorInvitation> {
        self.client.create(COLLECTION, &request, &Self::populated()).await
    }

    /// Find invitation by numeric ID
    pub async fn find_by_id(&self, id: u64) -> Result<Option<InstructorInvitation>> {
        let query = Self::populated().eq("id", id);
        let invitations = self.client.find::<InstructorInvitation>(COLLECTION, &query).await?;
        Ok(invitations.into_iter().next())
    }

    /// Find invitation by document ID
    pub async fn find_by_document_id(&self, document_id: &str) -> Result<Option<InstructorInvitation>> {
        self.client.find_one(COLLECTION, document_id, &Self::populated()).await
    }

    /// Pending or accepted invitations for one (sender, target, group) triple
    pub async fn find_blocking(
        &self,
        from_user: u64,
        to_instructor: u64,
        instructor_group: u64,
    ) -> Result<Vec<InstructorInvitation>> {
        let statuses: Vec<&str> = InvitationStatus::blocking().iter().map(|s| s.as_str()).collect();
        let query = Query::new()
            .relation_eq("from_user", "id", from_user)
            .relation_eq("to_instructor", "id", to_instructor)
            .relation_eq("instructor_group", "id", instructor_group)
            .in_list("invitation_status", &statuses);
        self.client.find(COLLECTION, &query).await
    }

    /// Invitations addressed to an instructor, filtered by numeric relation id
    pub async fn find_for_instructor_id(&self, instructor_id: u64) -> Result<Vec<InstructorInvitation>> {
        let query = Self::populated()
            .relation_eq("to_instructor", "id", instructor_id)
            .sort("invited_at:desc");
        self.client.find_all(COLLECTION, &query).await
    }

    /// Invitations addressed to an instructor, filtered by relation document id
    pub async fn find_for_instructor_document(&self, document_id: &str) -> Result<Vec<InstructorInvitation>> {
        let query = Self::populated()
            .relation_eq("to_instructor", "documentId", document_id)
            .sort("invited_at:desc");
        self.client.find_all(COLLECTION, &query).await
    }

    /// Every invitation, for client-side filtering
    pub async fn find_all(&self) -> Result<Vec<InstructorInvitation>> {
        self.client.find_all(COLLECTION, &Self::populated()).await
    }

    /// Invitations sent by a user
    pub async fn find_sent_by(&self, user_id: u64) -> Result<Vec<InstructorInvitation>> {
        let query = Self::populated()
            .relation_eq("from_user", "id", user_id)
            .sort("invited_at:desc");
        self.client.find_all(COLLECTION, &query).await
    }

    /// Pending invitations into a group
    pub async fn find_pending_for_group(&self, group_id: u64) -> Result<Vec<InstructorInvitation>> {
        let query = Query::new()
            .relation_eq("instructor_group", "id", group_id)
            .eq("invitation_status", InvitationStatus::Pending.as_str());
        self.client.find_all(COLLECTION, &query).await
    }

    /// Update invitation
    pub async fn update(
        &self,
        document_id: &str,
        request: UpdateInvitationRequest,
    ) -> Result<InstructorInvitation> {
        self.client
            .update(COLLECTION, document_id, &request, &Self::populated())
            .await
    }

    /// Delete invitation
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.client.delete(COLLECTION, document_id).await
    }
}

//! Instructor repository implementation

use crate::models::Instructor;
use crate::strapi::{FilterOp, Query, StrapiClient};
use crate::utils::errors::Result;

const COLLECTION: &str = "instructors";

#[derive(Clone, Debug)]
pub struct InstructorRepository {
    client: StrapiClient,
}

impl InstructorRepository {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    /// Find instructor by numeric ID (filter query, numeric IDs are not path-addressable)
    pub async fn find_by_id(&self, id: u64) -> Result<Option<Instructor>> {
        let query = Query::new().eq("id", id).populate("user");
        let instructors = self.client.find::<Instructor>(COLLECTION, &query).await?;
        Ok(instructors.into_iter().next())
    }

    /// Find instructor by document ID
    pub async fn find_by_document_id(&self, document_id: &str) -> Result<Option<Instructor>> {
        let query = Query::new().populate("user");
        self.client.find_one(COLLECTION, document_id, &query).await
    }

    /// Instructors owned by a user
    pub async fn find_by_user(&self, user_id: u64) -> Result<Vec<Instructor>> {
        let query = Query::new().relation_eq("user", "id", user_id).populate("user");
        self.client.find_all(COLLECTION, &query).await
    }

    /// Count instructors owned by a user
    pub async fn count_by_user(&self, user_id: u64) -> Result<u64> {
        let query = Query::new().relation_eq("user", "id", user_id);
        self.client.count(COLLECTION, &query).await
    }

    /// Case-insensitive name search over active instructors
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Instructor>> {
        let query = Query::new()
            .filter("name", FilterOp::ContainsI, term)
            .eq("is_active", true)
            .sort("name:asc")
            .populate("user");
        self.client.find(COLLECTION, &query).await
    }
}

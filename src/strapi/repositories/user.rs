//! User repository implementation

use crate::models::User;
use crate::strapi::{Query, StrapiClient};
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct UserRepository {
    client: StrapiClient,
}

impl UserRepository {
    pub fn new(client: StrapiClient) -> Self {
        Self { client }
    }

    /// Find user by numeric ID, with the subscription plan populated
    pub async fn find_by_id(&self, id: u64) -> Result<Option<User>> {
        let query = Query::new().eq("id", id).populate("subscription");
        let users = self.client.find_users::<User>(&query).await?;
        Ok(users.into_iter().next())
    }
}

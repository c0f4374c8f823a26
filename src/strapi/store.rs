//! Strapi store
//!
//! Groups the per-collection repositories behind one shared client

use crate::strapi::{
    GroupRepository, InstructorRepository, InteractionRepository, InvitationRepository, StrapiClient,
    UserRepository,
};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct StrapiStore {
    pub client: StrapiClient,
    pub users: UserRepository,
    pub instructors: InstructorRepository,
    pub groups: GroupRepository,
    pub invitations: InvitationRepository,
    pub interactions: InteractionRepository,
}

impl StrapiStore {
    pub fn new(client: StrapiClient) -> Self {
        Self {
            users: UserRepository::new(client.clone()),
            instructors: InstructorRepository::new(client.clone()),
            groups: GroupRepository::new(client.clone()),
            invitations: InvitationRepository::new(client.clone()),
            interactions: InteractionRepository::new(client.clone()),
            client,
        }
    }

    /// Whether the Strapi instance answers its health probe
    pub async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }
}

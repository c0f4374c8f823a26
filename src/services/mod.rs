//! Services module
//!
//! This module contains business logic services

pub mod capacity;
pub mod group;
pub mod instructor;
pub mod interaction;
pub mod invitation;
pub mod membership;
pub mod resolver;

// Re-export commonly used services
pub use capacity::{CapacityService, CapacityCheck};
pub use group::GroupService;
pub use instructor::InstructorService;
pub use interaction::InteractionService;
pub use invitation::{InvitationService, AcceptOutcome};
pub use membership::{MembershipService, MembershipChange};
pub use resolver::IdentifierResolver;

use tracing::warn;

use crate::config::settings::Settings;
use crate::strapi::{StrapiClient, StrapiStore};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub store: StrapiStore,
    pub resolver: IdentifierResolver,
    pub capacity_service: CapacityService,
    pub membership_service: MembershipService,
    pub group_service: GroupService,
    pub invitation_service: InvitationService,
    pub instructor_service: InstructorService,
    pub interaction_service: InteractionService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings) -> Result<Self> {
        let client = StrapiClient::new(&settings.strapi)?;
        Ok(Self::with_client(client, &settings))
    }

    /// Build every service on top of an existing client
    pub fn with_client(client: StrapiClient, settings: &Settings) -> Self {
        let store = StrapiStore::new(client.clone());
        let resolver = IdentifierResolver::new(client);
        let capacity_service = CapacityService::new(store.clone(), resolver.clone());
        let membership_service = MembershipService::new(
            store.clone(),
            resolver.clone(),
            settings.membership.max_write_attempts,
        );
        let group_service = GroupService::new(store.clone(), resolver.clone(), capacity_service.clone());
        let invitation_service = InvitationService::new(
            store.clone(),
            resolver.clone(),
            capacity_service.clone(),
            membership_service.clone(),
            settings.invitations.clone(),
        );
        let instructor_service = InstructorService::new(store.clone(), resolver.clone(), capacity_service.clone());
        let interaction_service = InteractionService::new(store.clone(), resolver.clone(), settings.features.interactions);

        Self {
            store,
            resolver,
            capacity_service,
            membership_service,
            group_service,
            invitation_service,
            instructor_service,
            interaction_service,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let strapi_healthy = match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Strapi health check failed");
                false
            }
        };

        ServiceHealthStatus {
            strapi_healthy,
            interactions_enabled: self.interaction_service.is_enabled(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub strapi_healthy: bool,
    pub interactions_enabled: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.strapi_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.strapi_healthy {
            issues.push("Strapi is unreachable or unhealthy".to_string());
        }

        issues
    }
}

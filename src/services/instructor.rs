//! Instructor service implementation
//!
//! Read-only access to instructor profiles. Instructors are created and
//! deleted by the platform itself, never here.

use tracing::debug;

use crate::models::{EntityKind, EntityRef, Instructor};
use crate::services::capacity::{CapacityCheck, CapacityService};
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, Result};

/// Shortest accepted search term
pub const MIN_SEARCH_LENGTH: usize = 2;

#[derive(Clone, Debug)]
pub struct InstructorService {
    store: StrapiStore,
    resolver: IdentifierResolver,
    capacity: CapacityService,
}

impl InstructorService {
    pub fn new(store: StrapiStore, resolver: IdentifierResolver, capacity: CapacityService) -> Self {
        Self { store, resolver, capacity }
    }

    /// Instructor by numeric or document id
    pub async fn get_instructor(&self, instructor: &EntityRef) -> Result<Instructor> {
        let found = match instructor {
            EntityRef::Numeric(id) => self.store.instructors.find_by_id(*id).await?,
            EntityRef::Document(document_id) => self.store.instructors.find_by_document_id(document_id).await?,
        };
        found.ok_or_else(|| HubError::UnresolvedIdentifier {
            kind: EntityKind::Instructor,
            identifier: instructor.to_string(),
        })
    }

    /// Instructor profiles owned by a user
    pub async fn instructors_for_user(&self, user: &EntityRef) -> Result<Vec<Instructor>> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        self.store.instructors.find_by_user(user_id).await
    }

    /// Active instructors whose name contains `term`, for picking invitees
    pub async fn search_instructors(&self, term: &str) -> Result<Vec<Instructor>> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LENGTH {
            return Err(HubError::InvalidInput(format!(
                "Search term must be at least {} characters",
                MIN_SEARCH_LENGTH
            )));
        }

        debug!(term = %term, "Searching instructors");
        self.store.instructors.search_by_name(term).await
    }

    /// Whether the user's plan allows another instructor profile
    pub async fn can_add_instructor(&self, user: &EntityRef) -> Result<CapacityCheck> {
        self.capacity.check_instructor_limit(user).await
    }
}

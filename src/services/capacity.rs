//! Capacity enforcer
//!
//! Plan-limit checks computed from counts. Checks are advisory: nothing is
//! reserved or locked between the check and the write that follows it.

use tracing::debug;

use crate::models::{EntityKind, EntityRef, InstructorGroup, PlanLimits};
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, LimitKind, Result};
use crate::utils::helpers::{dedupe_by_key, usage_summary};
use crate::utils::logging::log_capacity_denied;

/// Outcome of a capacity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityCheck {
    pub kind: LimitKind,
    /// User or group the check was made for
    pub subject: u64,
    pub used: u32,
    pub limit: Option<u32>,
    pub allowed: bool,
}

impl CapacityCheck {
    pub fn new(kind: LimitKind, subject: u64, used: u32, limit: Option<u32>) -> Self {
        let allowed = limit.map(|limit| used < limit).unwrap_or(true);
        Self { kind, subject, used, limit, allowed }
    }

    /// Slots left, `None` when unlimited
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }

    /// "X of Y used"
    pub fn summary(&self) -> String {
        usage_summary(self.used, self.limit)
    }

    /// Turn a denied check into [`HubError::CapacityExceeded`]
    pub fn ensure(self) -> Result<Self> {
        if self.allowed {
            return Ok(self);
        }

        let limit = self.limit.unwrap_or(0);
        log_capacity_denied(&self.kind.to_string(), self.subject, self.used, limit);
        Err(HubError::CapacityExceeded {
            kind: self.kind,
            used: self.used,
            limit,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CapacityService {
    store: StrapiStore,
    resolver: IdentifierResolver,
}

impl CapacityService {
    pub fn new(store: StrapiStore, resolver: IdentifierResolver) -> Self {
        Self { store, resolver }
    }

    /// Effective plan limits of a user
    pub async fn limits_for(&self, user_id: u64) -> Result<PlanLimits> {
        let user = self
            .store
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| HubError::UnresolvedIdentifier {
                kind: EntityKind::User,
                identifier: user_id.to_string(),
            })?;
        Ok(PlanLimits::for_user(&user))
    }

    /// Distinct groups a user owns or belongs to through one of their instructors
    pub async fn user_groups(&self, user: &EntityRef) -> Result<Vec<InstructorGroup>> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        self.user_groups_by_id(user_id).await
    }

    pub(crate) async fn user_groups_by_id(&self, user_id: u64) -> Result<Vec<InstructorGroup>> {
        let (owned, instructors) = futures::try_join!(
            self.store.groups.find_owned_by(user_id),
            self.store.instructors.find_by_user(user_id),
        )?;

        let instructor_ids: Vec<u64> = instructors.iter().map(|i| i.id).collect();
        let member_of = self.store.groups.find_with_members(&instructor_ids).await?;

        let groups = dedupe_by_key(owned.into_iter().chain(member_of).collect(), |g| g.document_id.clone());
        debug!(user_id = user_id, groups = groups.len(), "Collected user groups");
        Ok(groups)
    }

    /// Whether a user may create or join one more group
    pub async fn check_group_limit(&self, user: &EntityRef) -> Result<CapacityCheck> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        let groups = self.user_groups_by_id(user_id).await?;
        self.group_check_with_usage(user_id, groups.len() as u32).await
    }

    pub(crate) async fn group_check_with_usage(&self, user_id: u64, used: u32) -> Result<CapacityCheck> {
        let limits = self.limits_for(user_id).await?;
        Ok(CapacityCheck::new(LimitKind::Groups, user_id, used, limits.instructor_groups))
    }

    /// Whether a group may take one more member
    pub async fn check_member_limit(&self, group: &EntityRef) -> Result<CapacityCheck> {
        let group_id = self.resolver.resolve_id(EntityKind::Group, group).await?;
        let group = self
            .store
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| HubError::UnresolvedIdentifier {
                kind: EntityKind::Group,
                identifier: group_id.to_string(),
            })?;
        self.member_limit_for(&group).await
    }

    /// Member check for an already fetched group, against its owner's plan
    pub async fn member_limit_for(&self, group: &InstructorGroup) -> Result<CapacityCheck> {
        let (members, unresolved) = self
            .resolver
            .resolve_many(EntityKind::Instructor, &group.member_refs())
            .await?;
        if let Some(reference) = unresolved.into_iter().next() {
            return Err(HubError::UnresolvedIdentifier {
                kind: EntityKind::Instructor,
                identifier: reference.to_string(),
            });
        }

        self.member_check_with_usage(group, members.len() as u32).await
    }

    /// Member check with a member count the caller already resolved
    pub(crate) async fn member_check_with_usage(&self, group: &InstructorGroup, used: u32) -> Result<CapacityCheck> {
        let limit = match group.owner_ref() {
            Some(owner) => {
                let owner_id = self.resolver.resolve_id(EntityKind::User, &owner).await?;
                self.limits_for(owner_id).await?.group_members
            }
            None => None,
        };

        Ok(CapacityCheck::new(LimitKind::GroupMembers, group.id, used, limit))
    }

    /// Whether a user may own one more instructor profile
    pub async fn check_instructor_limit(&self, user: &EntityRef) -> Result<CapacityCheck> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        let used = self.store.instructors.count_by_user(user_id).await?;
        let limits = self.limits_for(user_id).await?;
        Ok(CapacityCheck::new(LimitKind::Instructors, user_id, used as u32, limits.instructors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_at_limit_is_denied() {
        let check = CapacityCheck::new(LimitKind::Groups, 1, 2, Some(2));
        assert!(!check.allowed);
        assert_eq!(check.remaining(), Some(0));
        assert_eq!(check.summary(), "2 of 2 used");
        assert!(matches!(
            check.ensure(),
            Err(HubError::CapacityExceeded { kind: LimitKind::Groups, used: 2, limit: 2 })
        ));
    }

    #[test]
    fn test_check_below_limit_is_allowed() {
        let check = CapacityCheck::new(LimitKind::GroupMembers, 4, 4, Some(5));
        assert!(check.allowed);
        assert_eq!(check.remaining(), Some(1));
        assert!(check.ensure().is_ok());
    }

    #[test]
    fn test_unlimited() {
        let check = CapacityCheck::new(LimitKind::Instructors, 1, 250, None);
        assert!(check.allowed);
        assert_eq!(check.remaining(), None);
        assert_eq!(check.summary(), "250 used (unlimited)");
    }
}

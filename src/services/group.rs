//! Group service implementation
//!
//! Creation, lookup, renaming and deletion of instructor groups.

use tracing::{debug, info, warn};

use crate::models::{CreateGroupRequest, EntityKind, EntityRef, InstructorGroup, UpdateGroupRequest};
use crate::services::capacity::CapacityService;
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, Result};
use crate::utils::helpers::{normalize_group_name, MAX_GROUP_NAME_LENGTH};
use crate::utils::logging::log_group_event;

#[derive(Clone, Debug)]
pub struct GroupService {
    store: StrapiStore,
    resolver: IdentifierResolver,
    capacity: CapacityService,
}

impl GroupService {
    pub fn new(store: StrapiStore, resolver: IdentifierResolver, capacity: CapacityService) -> Self {
        Self { store, resolver, capacity }
    }

    /// Create an empty group owned by `owner`, subject to the owner's group limit
    pub async fn create_group(&self, owner: &EntityRef, name: &str) -> Result<InstructorGroup> {
        let name = validated_name(name)?;
        let owner_id = self.resolver.resolve_id(EntityKind::User, owner).await?;
        debug!(owner_id = owner_id, name = %name, "Creating instructor group");

        let existing = self.capacity.user_groups_by_id(owner_id).await?;
        self.capacity
            .group_check_with_usage(owner_id, existing.len() as u32)
            .await?
            .ensure()?;

        let group = self
            .store
            .groups
            .create(CreateGroupRequest {
                name,
                owner: owner_id,
                instructors: Vec::new(),
            })
            .await?;

        info!(group_id = group.id, document_id = %group.document_id, owner_id = owner_id, "Instructor group created");
        log_group_event(group.id, "created", Some(owner_id), Some(&group.name));
        Ok(group)
    }

    /// Fetch a group by numeric id (filter query) or document id (path lookup)
    pub async fn get_group(&self, group: &EntityRef) -> Result<InstructorGroup> {
        let found = match group {
            EntityRef::Numeric(id) => self.store.groups.find_by_id(*id).await?,
            EntityRef::Document(document_id) => self.store.groups.find_by_document_id(document_id).await?,
        };

        found.ok_or_else(|| HubError::UnresolvedIdentifier {
            kind: EntityKind::Group,
            identifier: group.to_string(),
        })
    }

    /// Groups the user owns or belongs to
    pub async fn list_user_groups(&self, user: &EntityRef) -> Result<Vec<InstructorGroup>> {
        self.capacity.user_groups(user).await
    }

    /// Rename a group; owner only
    pub async fn rename_group(&self, group: &EntityRef, requester: &EntityRef, name: &str) -> Result<InstructorGroup> {
        let name = validated_name(name)?;
        let group = self.get_group(group).await?;
        let requester_id = self.resolver.resolve_id(EntityKind::User, requester).await?;
        self.ensure_owner(&group, requester_id).await?;

        let update = UpdateGroupRequest {
            name: Some(name),
            ..Default::default()
        };
        let updated = self.store.groups.update(&group.document_id, update).await?;

        log_group_event(updated.id, "renamed", Some(requester_id), Some(&updated.name));
        Ok(updated)
    }

    /// Delete a group and its pending invitations; owner only
    pub async fn delete_group(&self, group: &EntityRef, requester: &EntityRef) -> Result<()> {
        let group = self.get_group(group).await?;
        let requester_id = self.resolver.resolve_id(EntityKind::User, requester).await?;
        self.ensure_owner(&group, requester_id).await?;

        let pending = self.store.invitations.find_pending_for_group(group.id).await?;
        for invitation in &pending {
            if let Err(e) = self.store.invitations.delete(&invitation.document_id).await {
                warn!(
                    group_id = group.id,
                    invitation = %invitation.document_id,
                    error = %e,
                    "Failed to delete pending invitation of removed group"
                );
            }
        }

        self.store.groups.delete(&group.document_id).await?;

        info!(group_id = group.id, owner_id = requester_id, cleared_invitations = pending.len(), "Instructor group deleted");
        log_group_event(group.id, "deleted", Some(requester_id), None);
        Ok(())
    }

    async fn ensure_owner(&self, group: &InstructorGroup, user_id: u64) -> Result<()> {
        let owner_id = match group.owner_ref() {
            Some(owner) => Some(self.resolver.resolve_id(EntityKind::User, &owner).await?),
            None => None,
        };

        if owner_id == Some(user_id) {
            Ok(())
        } else {
            warn!(group_id = group.id, user_id = user_id, "Non-owner attempted an owner-only group operation");
            Err(HubError::PermissionDenied(format!(
                "only the owner can modify group '{}'",
                group.name
            )))
        }
    }
}

fn validated_name(name: &str) -> Result<String> {
    normalize_group_name(name).ok_or_else(|| {
        HubError::InvalidInput(format!(
            "group name must be between 1 and {} characters",
            MAX_GROUP_NAME_LENGTH
        ))
    })
}

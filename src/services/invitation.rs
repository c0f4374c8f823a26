//! Invitation service implementation
//!
//! This service drives the invitation lifecycle: pending on creation, then
//! exactly one of accepted / rejected / cancelled, after which the record is
//! deleted. Accepting runs strictly in order: resolve, check capacity, add the
//! member, mark accepted, delete. Nothing is written before both capacity
//! checks pass; nothing is rolled back once the membership write happened.

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::InvitationConfig;
use crate::models::{
    CreateInvitationRequest, EntityKind, EntityRef, Instructor, InstructorInvitation, InvitationStatus, Relation,
    StrapiEntity, UpdateInvitationRequest,
};
use crate::services::capacity::CapacityService;
use crate::services::membership::{MembershipChange, MembershipService};
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, Result, StrapiError};
use crate::utils::helpers::dedupe_by_key;
use crate::utils::logging::log_invitation_event;

/// Result of a successful acceptance
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    /// The invitation as it was marked before deletion
    pub invitation: InstructorInvitation,
    pub membership: MembershipChange,
    /// False when the invitee already belonged to the group through another instructor
    pub joined_new_group: bool,
}

/// Merge invitations gathered by several lookups: one entry per record,
/// newest first.
pub fn merge_invitations(invitations: Vec<InstructorInvitation>) -> Vec<InstructorInvitation> {
    let mut merged = dedupe_by_key(invitations, |i| i.identity());
    merged.sort_by(|a, b| b.invited_at.cmp(&a.invited_at));
    merged
}

#[derive(Clone, Debug)]
pub struct InvitationService {
    store: StrapiStore,
    resolver: IdentifierResolver,
    capacity: CapacityService,
    membership: MembershipService,
    config: InvitationConfig,
}

impl InvitationService {
    pub fn new(
        store: StrapiStore,
        resolver: IdentifierResolver,
        capacity: CapacityService,
        membership: MembershipService,
        config: InvitationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            capacity,
            membership,
            config,
        }
    }

    /// Invite an instructor into a group
    pub async fn create(
        &self,
        from_user: &EntityRef,
        to_instructor: &EntityRef,
        group: &EntityRef,
        message: Option<&str>,
    ) -> Result<InstructorInvitation> {
        let message = self.normalize_message(message)?;

        let (from_id, instructor_id, group_id) = futures::try_join!(
            self.resolver.resolve_id(EntityKind::User, from_user),
            self.resolver.resolve_id(EntityKind::Instructor, to_instructor),
            self.resolver.resolve_id(EntityKind::Group, group),
        )?;
        debug!(from_id = from_id, instructor_id = instructor_id, group_id = group_id, "Creating invitation");

        // Resolution trusts numeric ids, so confirm all three records exist before writing.
        let (sender, instructor, target_group) = futures::try_join!(
            self.store.users.find_by_id(from_id),
            self.store.instructors.find_by_id(instructor_id),
            self.store.groups.find_by_id(group_id),
        )?;
        if sender.is_none() {
            return Err(unresolved(EntityKind::User, from_user));
        }
        if instructor.is_none() {
            return Err(unresolved(EntityKind::Instructor, to_instructor));
        }
        let target_group = target_group.ok_or_else(|| unresolved(EntityKind::Group, group))?;

        let blocking = self
            .store
            .invitations
            .find_blocking(from_id, instructor_id, group_id)
            .await?;
        if let Some(status) = strongest_status(&blocking) {
            warn!(
                from_id = from_id,
                instructor_id = instructor_id,
                group_id = group_id,
                status = %status,
                "Duplicate invitation rejected"
            );
            return Err(HubError::DuplicateInvitation { status });
        }

        if self.membership.member_ids(&target_group).await?.contains(&instructor_id) {
            return Err(HubError::InvalidInput(format!(
                "instructor is already a member of '{}'",
                target_group.name
            )));
        }

        let invitation = self
            .store
            .invitations
            .create(CreateInvitationRequest {
                from_user: from_id,
                to_instructor: instructor_id,
                instructor_group: group_id,
                invitation_status: InvitationStatus::Pending,
                message,
                invited_at: Utc::now(),
                read: false,
            })
            .await?;

        log_invitation_event(&invitation.document_id, "created", Some(from_id), None);
        Ok(invitation)
    }

    /// Fetch one invitation with its relations populated
    pub async fn get(&self, invitation: &EntityRef) -> Result<InstructorInvitation> {
        let found = match invitation {
            EntityRef::Numeric(id) => self.store.invitations.find_by_id(*id).await?,
            EntityRef::Document(document_id) => self.store.invitations.find_by_document_id(document_id).await?,
        };
        found.ok_or_else(|| unresolved(EntityKind::Invitation, invitation))
    }

    /// Invitations received by any instructor the user owns
    pub async fn list_received(&self, user: &EntityRef) -> Result<Vec<InstructorInvitation>> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        let instructors = self.store.instructors.find_by_user(user_id).await?;
        self.received_for(&instructors).await
    }

    /// Invitations received by the given instructors
    pub async fn list_received_for_instructors(&self, instructors: &[EntityRef]) -> Result<Vec<InstructorInvitation>> {
        let mut found = Vec::with_capacity(instructors.len());
        for reference in instructors {
            let instructor = match reference {
                EntityRef::Numeric(id) => self.store.instructors.find_by_id(*id).await?,
                EntityRef::Document(document_id) => {
                    self.store.instructors.find_by_document_id(document_id).await?
                }
            };
            match instructor {
                Some(instructor) => found.push(instructor),
                None => warn!(identifier = %reference, "Skipping unknown instructor while listing invitations"),
            }
        }
        self.received_for(&found).await
    }

    async fn received_for(&self, instructors: &[Instructor]) -> Result<Vec<InstructorInvitation>> {
        if instructors.is_empty() {
            return Ok(Vec::new());
        }

        let lookups = instructors.iter().map(|instructor| async move {
            let (direct, by_document) = futures::try_join!(
                self.store.invitations.find_for_instructor_id(instructor.id),
                self.store.invitations.find_for_instructor_document(&instructor.document_id),
            )?;
            Ok::<_, HubError>(direct.into_iter().chain(by_document).collect::<Vec<_>>())
        });

        let mut collected = Vec::new();
        for result in join_all(lookups).await {
            collected.extend(result?);
        }

        if self.config.full_scan_fallback {
            let scanned = self.store.invitations.find_all().await?;
            let before = collected.len();
            collected.extend(scanned.into_iter().filter(|invitation| {
                invitation.to_instructor.as_ref().map_or(false, |target| {
                    instructors
                        .iter()
                        .any(|i| target.matches(i.id(), i.document_id()))
                })
            }));
            debug!(scanned_matches = collected.len() - before, "Full invitation scan merged");
        }

        Ok(merge_invitations(collected))
    }

    /// Invitations sent by the user
    pub async fn list_sent(&self, user: &EntityRef) -> Result<Vec<InstructorInvitation>> {
        let user_id = self.resolver.resolve_id(EntityKind::User, user).await?;
        let sent = self.store.invitations.find_sent_by(user_id).await?;
        Ok(merge_invitations(sent))
    }

    /// Pending received invitations not yet marked as read
    pub async fn unread_count(&self, user: &EntityRef) -> Result<usize> {
        let received = self.list_received(user).await?;
        Ok(received.iter().filter(|i| i.is_pending() && !i.read).count())
    }

    /// Accept an invitation and add the invited instructor to the group
    pub async fn accept(&self, invitation: &EntityRef) -> Result<AcceptOutcome> {
        let invitation = self.get(invitation).await?;
        if !invitation.is_pending() {
            return Err(HubError::InvalidStateTransition {
                from: invitation.invitation_status.to_string(),
                to: InvitationStatus::Accepted.to_string(),
            });
        }

        let instructor_ref = relation_ref(&invitation.to_instructor, "target instructor", &invitation)?;
        let group_ref = relation_ref(&invitation.instructor_group, "group", &invitation)?;
        let instructor_id = self.resolver.resolve_id(EntityKind::Instructor, &instructor_ref).await?;
        let group_id = self.resolver.resolve_id(EntityKind::Group, &group_ref).await?;

        let instructor = self
            .store
            .instructors
            .find_by_id(instructor_id)
            .await?
            .ok_or_else(|| unresolved(EntityKind::Instructor, &instructor_ref))?;
        let invitee_ref = instructor
            .user
            .as_ref()
            .and_then(|u| u.to_ref())
            .ok_or_else(|| HubError::InvalidInput(format!("instructor '{}' has no owning user", instructor.name)))?;
        let invitee_id = self.resolver.resolve_id(EntityKind::User, &invitee_ref).await?;

        let group = self
            .store
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| unresolved(EntityKind::Group, &group_ref))?;

        let members = self.membership.member_ids(&group).await?;
        let instructor_is_member = members.contains(&instructor_id);

        let invitee_groups = self.capacity.user_groups_by_id(invitee_id).await?;
        let already_in_group = invitee_groups.iter().any(|g| g.id == group_id);

        // Only a genuinely new group membership counts against the group limit.
        if !already_in_group {
            self.capacity
                .group_check_with_usage(invitee_id, invitee_groups.len() as u32)
                .await?
                .ensure()?;
        }
        if !instructor_is_member {
            self.capacity
                .member_check_with_usage(&group, members.len() as u32)
                .await?
                .ensure()?;
        }

        let membership = self
            .membership
            .add_instructors(&EntityRef::Numeric(group_id), &[EntityRef::Numeric(instructor_id)])
            .await?;

        let accepted = self
            .store
            .invitations
            .update(
                &invitation.document_id,
                UpdateInvitationRequest {
                    invitation_status: Some(InvitationStatus::Accepted),
                    responded_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                warn!(invitation = %invitation.document_id, error = %e, "Member added but invitation could not be marked accepted");
                e
            })?;

        self.store
            .invitations
            .delete(&invitation.document_id)
            .await
            .map_err(|e| {
                warn!(invitation = %invitation.document_id, error = %e, "Invitation accepted but could not be deleted");
                e
            })?;

        info!(
            invitation = %invitation.document_id,
            instructor_id = instructor_id,
            group_id = group_id,
            user_id = invitee_id,
            "Invitation accepted"
        );
        log_invitation_event(&invitation.document_id, "accepted", Some(invitee_id), None);

        Ok(AcceptOutcome {
            invitation: accepted,
            membership,
            joined_new_group: !already_in_group,
        })
    }

    /// Decline an invitation; the record is removed
    pub async fn reject(&self, invitation: &EntityRef) -> Result<()> {
        self.remove(invitation, InvitationStatus::Rejected).await
    }

    /// Withdraw a sent invitation; the record is removed
    pub async fn cancel(&self, invitation: &EntityRef) -> Result<()> {
        self.remove(invitation, InvitationStatus::Cancelled).await
    }

    /// Mark an invitation as read without touching its status
    pub async fn mark_as_read(&self, invitation: &EntityRef) -> Result<InstructorInvitation> {
        let document_id = self.resolver.resolve_document_id(EntityKind::Invitation, invitation).await?;
        let update = UpdateInvitationRequest {
            read: Some(true),
            ..Default::default()
        };

        let updated = self
            .store
            .invitations
            .update(&document_id, update)
            .await
            .map_err(|e| not_found_as_unresolved(e, invitation))?;

        debug!(invitation = %document_id, "Invitation marked as read");
        Ok(updated)
    }

    async fn remove(&self, invitation: &EntityRef, outcome: InvitationStatus) -> Result<()> {
        let document_id = self.resolver.resolve_document_id(EntityKind::Invitation, invitation).await?;
        self.store
            .invitations
            .delete(&document_id)
            .await
            .map_err(|e| not_found_as_unresolved(e, invitation))?;

        log_invitation_event(&document_id, outcome.as_str(), None, None);
        Ok(())
    }

    fn normalize_message(&self, message: Option<&str>) -> Result<Option<String>> {
        let message = message.map(str::trim).filter(|m| !m.is_empty());
        match message {
            Some(m) if m.chars().count() > self.config.max_message_length => Err(HubError::InvalidInput(format!(
                "invitation message must be at most {} characters",
                self.config.max_message_length
            ))),
            other => Ok(other.map(str::to_string)),
        }
    }
}

/// Accepted wins over pending so callers can treat the request as fulfilled
fn strongest_status(existing: &[InstructorInvitation]) -> Option<InvitationStatus> {
    if existing.iter().any(|i| i.invitation_status == InvitationStatus::Accepted) {
        Some(InvitationStatus::Accepted)
    } else if existing.iter().any(|i| i.invitation_status == InvitationStatus::Pending) {
        Some(InvitationStatus::Pending)
    } else {
        None
    }
}

fn relation_ref<T: StrapiEntity>(
    relation: &Option<Relation<T>>,
    what: &str,
    invitation: &InstructorInvitation,
) -> Result<EntityRef> {
    relation
        .as_ref()
        .and_then(|r| r.to_ref())
        .ok_or_else(|| HubError::InvalidInput(format!("invitation '{}' has no {}", invitation.document_id, what)))
}

fn unresolved(kind: EntityKind, reference: &EntityRef) -> HubError {
    HubError::UnresolvedIdentifier {
        kind,
        identifier: reference.to_string(),
    }
}

fn not_found_as_unresolved(error: HubError, invitation: &EntityRef) -> HubError {
    match error {
        HubError::Strapi(StrapiError::NotFound(_)) => unresolved(EntityKind::Invitation, invitation),
        other => other,
    }
}

//! Membership mutator
//!
//! Maintains the `instructors` set of a group. Strapi only accepts the full
//! replacement array, so every change is read, compute, write. Before writing,
//! the group's `updatedAt` is re-read and compared with the snapshot; on a
//! mismatch the change is recomputed from fresh state. Strapi offers no
//! conditional write, so a writer landing between the re-read and the PUT can
//! still be lost.

use tracing::{debug, info, warn};

use crate::models::{EntityKind, EntityRef, InstructorGroup, UpdateGroupRequest};
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, Result};
use crate::utils::logging::log_group_event;

/// Union of the current members and the additions, without duplicates.
/// Existing order is kept and new ids are appended.
pub fn merge_members(current: &[u64], additions: &[u64]) -> Vec<u64> {
    let mut merged: Vec<u64> = Vec::with_capacity(current.len() + additions.len());
    for id in current.iter().chain(additions) {
        if !merged.contains(id) {
            merged.push(*id);
        }
    }
    merged
}

/// Current members minus `removed`, without duplicates
pub fn without_member(current: &[u64], removed: u64) -> Vec<u64> {
    merge_members(current, &[])
        .into_iter()
        .filter(|id| *id != removed)
        .collect()
}

fn same_members(a: &[u64], b: &[u64]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

/// Result of a membership mutation
#[derive(Debug, Clone)]
pub struct MembershipChange {
    pub group: InstructorGroup,
    pub members: Vec<u64>,
    pub added: Vec<u64>,
    pub removed: Vec<u64>,
    /// Identifiers that could not be resolved and were left out
    pub skipped: Vec<EntityRef>,
}

impl MembershipChange {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct MembershipService {
    store: StrapiStore,
    resolver: IdentifierResolver,
    max_write_attempts: u32,
}

impl MembershipService {
    pub fn new(store: StrapiStore, resolver: IdentifierResolver, max_write_attempts: u32) -> Self {
        Self {
            store,
            resolver,
            max_write_attempts: max_write_attempts.max(1),
        }
    }

    /// Add instructors to a group. Unresolvable identifiers are skipped with a
    /// warning; re-adding present members changes nothing.
    pub async fn add_instructors(&self, group: &EntityRef, instructors: &[EntityRef]) -> Result<MembershipChange> {
        let group_id = self.resolver.resolve_id(EntityKind::Group, group).await?;
        let (ids, skipped) = self.resolver.resolve_many(EntityKind::Instructor, instructors).await?;

        if !skipped.is_empty() {
            warn!(group_id = group_id, skipped = skipped.len(), "Some instructors could not be resolved and were skipped");
        }

        let mut change = self
            .write_members(group_id, |current| merge_members(current, &ids))
            .await?;
        change.skipped = skipped;

        if change.changed() {
            info!(group_id = group_id, added = ?change.added, "Instructors added to group");
            log_group_event(group_id, "members_added", None, None);
        } else {
            debug!(group_id = group_id, "No new instructors to add");
        }
        Ok(change)
    }

    /// Remove one instructor from a group
    pub async fn remove_instructor(&self, group: &EntityRef, instructor: &EntityRef) -> Result<MembershipChange> {
        let group_id = self.resolver.resolve_id(EntityKind::Group, group).await?;
        let instructor_id = self.resolver.resolve_id(EntityKind::Instructor, instructor).await?;

        let change = self
            .write_members(group_id, |current| without_member(current, instructor_id))
            .await?;

        if change.changed() {
            info!(group_id = group_id, instructor_id = instructor_id, "Instructor removed from group");
            log_group_event(group_id, "member_removed", None, None);
        } else {
            debug!(group_id = group_id, instructor_id = instructor_id, "Instructor was not a member");
        }
        Ok(change)
    }

    /// Current member ids of a fetched group
    pub async fn member_ids(&self, group: &InstructorGroup) -> Result<Vec<u64>> {
        let (ids, unresolved) = self
            .resolver
            .resolve_many(EntityKind::Instructor, &group.member_refs())
            .await?;

        // Rewriting the array without these would drop them from the group.
        if let Some(reference) = unresolved.into_iter().next() {
            return Err(HubError::UnresolvedIdentifier {
                kind: EntityKind::Instructor,
                identifier: reference.to_string(),
            });
        }
        Ok(ids)
    }

    async fn write_members<F>(&self, group_id: u64, compute: F) -> Result<MembershipChange>
    where
        F: Fn(&[u64]) -> Vec<u64>,
    {
        for attempt in 1..=self.max_write_attempts {
            let snapshot = self.fetch_group(group_id).await?;
            let current = self.member_ids(&snapshot).await?;
            let next = compute(&current);

            let added: Vec<u64> = next.iter().filter(|id| !current.contains(id)).copied().collect();
            let removed: Vec<u64> = current.iter().filter(|id| !next.contains(id)).copied().collect();

            // A store-side duplicate still warrants a write to clean it up.
            let stored_len = snapshot.member_refs().len();
            if same_members(&current, &next) && stored_len == current.len() {
                return Ok(MembershipChange {
                    group: snapshot,
                    members: current,
                    added,
                    removed,
                    skipped: Vec::new(),
                });
            }

            let latest = self
                .store
                .groups
                .find_by_document_id(&snapshot.document_id)
                .await?
                .ok_or_else(|| HubError::UnresolvedIdentifier {
                    kind: EntityKind::Group,
                    identifier: snapshot.document_id.clone(),
                })?;

            if latest.updated_at != snapshot.updated_at {
                warn!(
                    group_id = group_id,
                    attempt = attempt,
                    "Group changed while computing membership, retrying"
                );
                continue;
            }

            let update = UpdateGroupRequest {
                instructors: Some(next.clone()),
                ..Default::default()
            };
            let group = self.store.groups.update(&snapshot.document_id, update).await?;

            return Ok(MembershipChange {
                group,
                members: next,
                added,
                removed,
                skipped: Vec::new(),
            });
        }

        Err(HubError::ConcurrentModification {
            kind: EntityKind::Group,
            identifier: group_id.to_string(),
            attempts: self.max_write_attempts,
        })
    }

    async fn fetch_group(&self, group_id: u64) -> Result<InstructorGroup> {
        self.store
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| HubError::UnresolvedIdentifier {
                kind: EntityKind::Group,
                identifier: group_id.to_string(),
            })
    }
}

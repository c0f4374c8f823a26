//! Interaction service implementation
//!
//! Post views and likes are recorded per user in Strapi, so every device
//! sees the same state.

use tracing::{debug, info};

use crate::models::{CreateInteractionRequest, EntityKind, EntityRef, InteractionKind};
use crate::services::resolver::IdentifierResolver;
use crate::strapi::StrapiStore;
use crate::utils::errors::{HubError, Result};

#[derive(Clone, Debug)]
pub struct InteractionService {
    store: StrapiStore,
    resolver: IdentifierResolver,
    enabled: bool,
}

impl InteractionService {
    pub fn new(store: StrapiStore, resolver: IdentifierResolver, enabled: bool) -> Self {
        Self { store, resolver, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn resolve_pair(&self, user: &EntityRef, post: &EntityRef) -> Result<(u64, u64)> {
        if !self.enabled {
            return Err(HubError::Config("post interactions are disabled".to_string()));
        }
        futures::try_join!(
            self.resolver.resolve_id(EntityKind::User, user),
            self.resolver.resolve_id(EntityKind::Post, post),
        )
    }

    /// Record a view once per user and post; returns true when newly recorded
    pub async fn record_view(&self, user: &EntityRef, post: &EntityRef) -> Result<bool> {
        let (user_id, post_id) = self.resolve_pair(user, post).await?;

        let existing = self.store.interactions.find(user_id, post_id, InteractionKind::View).await?;
        if !existing.is_empty() {
            debug!(user_id = user_id, post_id = post_id, "View already recorded");
            return Ok(false);
        }

        self.store
            .interactions
            .create(CreateInteractionRequest {
                user: user_id,
                post: post_id,
                kind: InteractionKind::View,
            })
            .await?;
        debug!(user_id = user_id, post_id = post_id, "View recorded");
        Ok(true)
    }

    /// Flip the like state; returns whether the post is liked afterwards
    pub async fn toggle_like(&self, user: &EntityRef, post: &EntityRef) -> Result<bool> {
        let (user_id, post_id) = self.resolve_pair(user, post).await?;

        let existing = self.store.interactions.find(user_id, post_id, InteractionKind::Like).await?;
        if existing.is_empty() {
            self.store
                .interactions
                .create(CreateInteractionRequest {
                    user: user_id,
                    post: post_id,
                    kind: InteractionKind::Like,
                })
                .await?;
            info!(user_id = user_id, post_id = post_id, "Post liked");
            return Ok(true);
        }

        for like in &existing {
            self.store.interactions.delete(&like.document_id).await?;
        }
        info!(user_id = user_id, post_id = post_id, "Post unliked");
        Ok(false)
    }

    pub async fn has_liked(&self, user: &EntityRef, post: &EntityRef) -> Result<bool> {
        let (user_id, post_id) = self.resolve_pair(user, post).await?;
        let existing = self.store.interactions.find(user_id, post_id, InteractionKind::Like).await?;
        Ok(!existing.is_empty())
    }

    pub async fn like_count(&self, post: &EntityRef) -> Result<u64> {
        self.count(post, InteractionKind::Like).await
    }

    pub async fn view_count(&self, post: &EntityRef) -> Result<u64> {
        self.count(post, InteractionKind::View).await
    }

    async fn count(&self, post: &EntityRef, kind: InteractionKind) -> Result<u64> {
        if !self.enabled {
            return Err(HubError::Config("post interactions are disabled".to_string()));
        }
        let post_id = self.resolver.resolve_id(EntityKind::Post, post).await?;
        self.store.interactions.count(post_id, kind).await
    }
}

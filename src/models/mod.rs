//! Data models module
//!
//! This module contains the typed projections of the entities stored in Strapi,
//! plus the identifier types used to address them.

pub mod user;
pub mod instructor;
pub mod group;
pub mod invitation;
pub mod interaction;

// Re-export commonly used models
pub use user::{User, Subscription, PlanLimits};
pub use instructor::{Instructor, Socials};
pub use group::{InstructorGroup, CreateGroupRequest, UpdateGroupRequest};
pub use invitation::{InstructorInvitation, InvitationStatus, CreateInvitationRequest, UpdateInvitationRequest};
pub use interaction::{PostInteraction, InteractionKind, Post, CreateInteractionRequest};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{HubError, Result};

/// The kinds of entity this crate addresses in the external store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Instructor,
    Group,
    Invitation,
    Post,
    Interaction,
}

impl EntityKind {
    /// REST collection path segment for this kind
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Instructor => "instructors",
            EntityKind::Group => "instructor-groups",
            EntityKind::Invitation => "instructor-invitations",
            EntityKind::Post => "posts",
            EntityKind::Interaction => "post-interactions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Instructor => "instructor",
            EntityKind::Group => "group",
            EntityKind::Invitation => "invitation",
            EntityKind::Post => "post",
            EntityKind::Interaction => "interaction",
        };
        f.write_str(name)
    }
}

/// Canonical identifier accepted at every public boundary.
///
/// A value that parses as a positive integer is a numeric id; anything else is
/// treated as an opaque Strapi `documentId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Numeric(u64),
    Document(String),
}

impl EntityRef {
    /// Parse a raw identifier string
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HubError::InvalidInput("identifier must not be empty".to_string()));
        }

        match trimmed.parse::<u64>() {
            Ok(0) => Err(HubError::InvalidInput("identifier must be a positive integer".to_string())),
            Ok(id) => Ok(EntityRef::Numeric(id)),
            Err(_) if trimmed.starts_with('-') && trimmed[1..].chars().all(|c| c.is_ascii_digit()) => {
                Err(HubError::InvalidInput("identifier must be a positive integer".to_string()))
            }
            Err(_) => Ok(EntityRef::Document(trimmed.to_string())),
        }
    }

}

impl From<u64> for EntityRef {
    fn from(id: u64) -> Self {
        EntityRef::Numeric(id)
    }
}

impl FromStr for EntityRef {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        EntityRef::parse(s)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Numeric(id) => write!(f, "{}", id),
            EntityRef::Document(doc) => f.write_str(doc),
        }
    }
}

/// Implemented by every entity that Strapi returns with `id` and `documentId`
pub trait StrapiEntity {
    fn id(&self) -> u64;

    fn document_id(&self) -> Option<&str>;
}

/// A relation field as Strapi may return it: a bare id, an id or documentId
/// string, or the populated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Id(u64),
    Key(String),
    Entity(Box<T>),
}

impl<T> Relation<T> {
    /// The populated entity, when the relation was expanded
    pub fn entity(&self) -> Option<&T> {
        match self {
            Relation::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}

impl<T: StrapiEntity> Relation<T> {
    /// Normalize the relation into an [`EntityRef`]
    pub fn to_ref(&self) -> Option<EntityRef> {
        match self {
            Relation::Id(0) => None,
            Relation::Id(id) => Some(EntityRef::Numeric(*id)),
            Relation::Key(raw) => EntityRef::parse(raw).ok(),
            Relation::Entity(entity) => Some(EntityRef::Numeric(entity.id())),
        }
    }

    /// Whether this relation points at the given entity
    pub fn matches(&self, id: u64, document_id: Option<&str>) -> bool {
        match self {
            Relation::Id(rel_id) => *rel_id == id,
            Relation::Key(raw) => match EntityRef::parse(raw) {
                Ok(EntityRef::Numeric(rel_id)) => rel_id == id,
                Ok(EntityRef::Document(doc)) => document_id == Some(doc.as_str()),
                Err(_) => false,
            },
            Relation::Entity(entity) => entity.id() == id,
        }
    }
}

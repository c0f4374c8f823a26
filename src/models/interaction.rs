//! Post interaction model
//!
//! Per-user view and like records, stored in Strapi instead of browser flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Relation, StrapiEntity, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Like,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Like => "like",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl StrapiEntity for Post {
    fn id(&self) -> u64 {
        self.id
    }

    fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInteraction {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub user: Option<Relation<User>>,
    #[serde(default)]
    pub post: Option<Relation<Post>>,
    pub kind: InteractionKind,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInteractionRequest {
    pub user: u64,
    pub post: u64,
    pub kind: InteractionKind,
}

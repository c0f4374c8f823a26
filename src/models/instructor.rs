//! Instructor model

use serde::{Deserialize, Serialize};

use super::{Relation, StrapiEntity, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub socials: Option<Socials>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub user: Option<Relation<User>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

fn default_active() -> bool {
    true
}

impl StrapiEntity for Instructor {
    fn id(&self) -> u64 {
        self.id
    }

    fn document_id(&self) -> Option<&str> {
        Some(&self.document_id)
    }
}

//! Instructor group model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityRef, Instructor, Relation, StrapiEntity, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorGroup {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Option<Relation<User>>,
    #[serde(default)]
    pub instructors: Vec<Relation<Instructor>>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InstructorGroup {
    /// Member references as returned by the store, in store order
    pub fn member_refs(&self) -> Vec<EntityRef> {
        self.instructors.iter().filter_map(|r| r.to_ref()).collect()
    }

    pub fn owner_ref(&self) -> Option<EntityRef> {
        self.owner.as_ref().and_then(|r| r.to_ref())
    }

    pub fn is_owned_by(&self, user_id: u64) -> bool {
        self.owner.as_ref().map(|o| o.matches(user_id, None)).unwrap_or(false)
    }
}

impl StrapiEntity for InstructorGroup {
    fn id(&self) -> u64 {
        self.id
    }

    fn document_id(&self) -> Option<&str> {
        Some(&self.document_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub owner: u64,
    pub instructors: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructors: Option<Vec<u64>>,
}

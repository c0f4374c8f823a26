//! Instructor invitation model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Instructor, InstructorGroup, Relation, StrapiEntity, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
            InvitationStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses that block a new invitation for the same triple
    pub fn blocking() -> [InvitationStatus; 2] {
        [InvitationStatus::Pending, InvitationStatus::Accepted]
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorInvitation {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub from_user: Option<Relation<User>>,
    #[serde(default)]
    pub to_instructor: Option<Relation<Instructor>>,
    #[serde(default)]
    pub instructor_group: Option<Relation<InstructorGroup>>,
    pub invitation_status: InvitationStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub invited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}

impl InstructorInvitation {
    /// Key used to merge results gathered by different lookups
    pub fn identity(&self) -> String {
        if self.document_id.is_empty() {
            self.id.to_string()
        } else {
            self.document_id.clone()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.invitation_status == InvitationStatus::Pending
    }
}

impl StrapiEntity for InstructorInvitation {
    fn id(&self) -> u64 {
        self.id
    }

    fn document_id(&self) -> Option<&str> {
        Some(&self.document_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    pub from_user: u64,
    pub to_instructor: u64,
    pub instructor_group: u64,
    pub invitation_status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub invited_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInvitationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_status: Option<InvitationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_with_bare_relations() {
        let invitation: InstructorInvitation = serde_json::from_value(serde_json::json!({
            "id": 3,
            "documentId": "inv3",
            "from_user": 1,
            "to_instructor": "12",
            "instructor_group": {"id": 4, "documentId": "grp4", "name": "Algebra Mentors"},
            "invitation_status": "pending",
            "invited_at": "2024-03-01T10:00:00.000Z",
            "read": false
        }))
        .unwrap();

        assert!(invitation.is_pending());
        assert_eq!(invitation.identity(), "inv3");
        assert!(invitation.to_instructor.unwrap().matches(12, None));
        assert_eq!(
            invitation.instructor_group.unwrap().entity().map(|g| g.name.as_str()),
            Some("Algebra Mentors")
        );
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let update = UpdateInvitationRequest {
            read: Some(true),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"read": true}));
    }
}

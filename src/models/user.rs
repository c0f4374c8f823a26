//! User model

use serde::{Deserialize, Serialize};

use super::{Relation, StrapiEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub instructor_limit: Option<u32>,
    #[serde(default)]
    pub instructor_group_limit: Option<u32>,
    #[serde(default)]
    pub user_group_member_limit: Option<u32>,
    #[serde(default)]
    pub subscription: Option<Relation<Subscription>>,
}

/// Plan attached to a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount_instructor_allowed: Option<u32>,
    #[serde(default)]
    pub amount_instructor_group_allowed: Option<u32>,
    #[serde(default)]
    pub amount_group_member_allowed: Option<u32>,
}

impl StrapiEntity for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

/// Effective plan limits; `None` means unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanLimits {
    pub instructors: Option<u32>,
    pub instructor_groups: Option<u32>,
    pub group_members: Option<u32>,
}

impl PlanLimits {
    /// Derive limits from the user's own fields, falling back to the subscription plan.
    /// A limit of 0 counts as absent.
    pub fn for_user(user: &User) -> Self {
        let plan = user.subscription.as_ref().and_then(|s| s.entity());

        Self {
            instructors: effective(user.instructor_limit, plan.and_then(|p| p.amount_instructor_allowed)),
            instructor_groups: effective(
                user.instructor_group_limit,
                plan.and_then(|p| p.amount_instructor_group_allowed),
            ),
            group_members: effective(
                user.user_group_member_limit,
                plan.and_then(|p| p.amount_group_member_allowed),
            ),
        }
    }
}

fn effective(primary: Option<u32>, fallback: Option<u32>) -> Option<u32> {
    primary.filter(|v| *v > 0).or(fallback.filter(|v| *v > 0))
}

//! Error handling for Instructor Hub
//!
//! This module defines the main error types used throughout the crate
//! and provides a unified error handling strategy.

use thiserror::Error;

use crate::models::invitation::InvitationStatus;
use crate::models::EntityKind;

/// Main error type for Instructor Hub
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Strapi API error: {0}")]
    Strapi(#[from] StrapiError),

    #[error("Could not find {kind} '{identifier}'")]
    UnresolvedIdentifier { kind: EntityKind, identifier: String },

    #[error("{}", duplicate_message(.status))]
    DuplicateInvitation { status: InvitationStatus },

    #[error("{kind} limit reached: {used} of {limit} used")]
    CapacityExceeded { kind: LimitKind, used: u32, limit: u32 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Concurrent modification of {kind} '{identifier}' after {attempts} attempts")]
    ConcurrentModification { kind: EntityKind, identifier: String, attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

fn duplicate_message(status: &InvitationStatus) -> String {
    match status {
        InvitationStatus::Accepted => {
            "This instructor has already accepted an invitation to this group".to_string()
        }
        _ => "An invitation to this group is already pending for this instructor".to_string(),
    }
}

/// Strapi transport and protocol errors
#[derive(Error, Debug)]
pub enum StrapiError {
    #[error("Strapi request failed: {0}")]
    RequestFailed(String),

    #[error("Strapi request timed out")]
    Timeout,

    #[error("Strapi service unavailable")]
    ServiceUnavailable,

    #[error("Invalid Strapi response: {0}")]
    InvalidResponse(String),

    #[error("Strapi returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Which plan limit a capacity check was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Groups a user may own or belong to
    Groups,
    /// Members a group may hold
    GroupMembers,
    /// Instructor profiles a user may own
    Instructors,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Groups => write!(f, "Group"),
            LimitKind::GroupMembers => write!(f, "Group member"),
            LimitKind::Instructors => write!(f, "Instructor"),
        }
    }
}

/// Result type alias for Instructor Hub operations
pub type Result<T> = std::result::Result<T, HubError>;

impl HubError {
    /// Check if the error is recoverable by re-triggering the action
    pub fn is_recoverable(&self) -> bool {
        match self {
            HubError::Strapi(e) => e.is_transient(),
            HubError::UnresolvedIdentifier { .. } => false,
            HubError::DuplicateInvitation { .. } => false,
            HubError::CapacityExceeded { .. } => false,
            HubError::InvalidStateTransition { .. } => false,
            HubError::ConcurrentModification { .. } => true,
            HubError::Config(_) => false,
            HubError::PermissionDenied(_) => false,
            HubError::InvalidInput(_) => false,
            HubError::Http(_) => true,
            HubError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HubError::Config(_) => ErrorSeverity::Critical,
            HubError::PermissionDenied(_) => ErrorSeverity::Warning,
            HubError::CapacityExceeded { .. } => ErrorSeverity::Warning,
            HubError::DuplicateInvitation { .. } => ErrorSeverity::Info,
            HubError::InvalidInput(_) => ErrorSeverity::Info,
            HubError::UnresolvedIdentifier { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Whether the caller should offer upgrade / manage-groups remediation
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, HubError::CapacityExceeded { .. })
    }

    /// Human readable message suitable for a toast or dialog
    pub fn user_message(&self) -> String {
        match self {
            HubError::CapacityExceeded { kind, used, limit } => format!(
                "{} limit reached ({} of {} used). Upgrade your plan or manage your existing groups.",
                kind, used, limit
            ),
            HubError::Strapi(_) | HubError::Http(_) => {
                "Something went wrong while talking to the server. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl StrapiError {
    /// Network-level failures that a retry may fix
    pub fn is_transient(&self) -> bool {
        match self {
            StrapiError::Timeout | StrapiError::ServiceUnavailable | StrapiError::RequestFailed(_) => true,
            StrapiError::Status { status, .. } => *status >= 500 || *status == 429,
            StrapiError::InvalidResponse(_) | StrapiError::NotFound(_) => false,
        }
    }
}

impl From<reqwest::Error> for StrapiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StrapiError::Timeout
        } else if e.is_connect() {
            StrapiError::ServiceUnavailable
        } else if e.is_decode() {
            StrapiError::InvalidResponse(e.to_string())
        } else {
            StrapiError::RequestFailed(e.to_string())
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

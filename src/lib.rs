//! Instructor Hub
//!
//! Coordinator for instructor groups and the invitations that fill them, on
//! top of a Strapi CMS reached over its REST API. This library provides
//! identifier resolution, plan-limit enforcement, group membership updates
//! and the invitation lifecycle.

pub mod config;
pub mod services;
pub mod models;
pub mod strapi;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{HubError, Result};

// Re-export main components for easy access
pub use models::EntityRef;
pub use services::ServiceFactory;
pub use strapi::{StrapiClient, StrapiStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}

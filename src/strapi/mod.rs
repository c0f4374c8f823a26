//! Strapi module
//!
//! This module handles the REST connection to Strapi and per-collection access

pub mod client;
pub mod query;
pub mod response;
pub mod repositories;
pub mod store;

// Re-export commonly used Strapi components
pub use client::StrapiClient;
pub use query::{Query, FilterOp};
pub use response::{CollectionResponse, Pagination, Identity};
pub use repositories::{UserRepository, InstructorRepository, GroupRepository, InvitationRepository, InteractionRepository};
pub use store::StrapiStore;

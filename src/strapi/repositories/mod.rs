//! Strapi repositories module
//!
//! This module contains one repository per Strapi collection

pub mod user;
pub mod instructor;
pub mod group;
pub mod invitation;
pub mod interaction;

// Re-export repositories
pub use user::UserRepository;
pub use instructor::InstructorRepository;
pub use group::GroupRepository;
pub use invitation::InvitationRepository;
pub use interaction::InteractionRepository;

//! Test helpers module
//!
//! A fake Strapi server and a context wiring the services to it.

#![allow(dead_code)]

pub mod strapi_mock;
pub mod test_context;

pub use test_context::*;

//! Anonymous sessions backed by signed JWTs.
//!
//! This module provides:
//! - JWT token creation and validation
//! - the `AuthUser` extractor that guards the store routes

mod extract;
pub mod jwt;
pub mod types;

pub use extract::AuthUser;
pub use types::AuthConfig;

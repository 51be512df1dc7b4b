//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Mock login against the public demo user directory

pub mod auth;

//! Request middleware
//!
//! - [`auth`]: resolves the caller's identity from a bearer token once per
//!   request and exposes it through extractors.
//! - [`role`]: gates the admin surface on the resolved identity.

pub mod auth;
pub mod role;

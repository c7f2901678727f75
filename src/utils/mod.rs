//! Shared utilities.
//!
//! - [`errors`]: application error type and taxonomy
//! - [`file_storage`]: storage trait + local-disk backend
//! - [`jwt`]: token creation and verification
//! - [`pagination`]: request pagination plumbing
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod file_storage;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod serde;

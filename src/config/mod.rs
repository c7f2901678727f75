//! Application configuration modules
//!
//! This module contains configuration structures and utilities for:
//! - CORS settings
//! - Database connections
//! - JWT authentication
//! - Rate limiting
//! - File storage

pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
pub mod storage;

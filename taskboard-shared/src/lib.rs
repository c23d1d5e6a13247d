//! # Taskboard Shared Library
//!
//! Shared types, persistence and access rules used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, JWT tokens, and project/task access rules
//! - `db`: Connection pool and migrations
//! - `board`: Client-side task board state with optimistic status moves

pub mod auth;
pub mod board;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: User directory and profile
/// - `projects`: Projects, members, analytics and export
/// - `tasks`: Tasks within a project

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use serde::{Deserialize, Deserializer};

/// Deserializes a string with surrounding whitespace removed
///
/// Runs before `validator`, so a blank title fails `length(min = 1)`.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// [`trimmed`] for optional fields; pair with `#[serde(default)]`
pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}

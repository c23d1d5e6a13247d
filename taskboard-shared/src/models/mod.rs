/// Database models for Taskboard
///
/// Each model owns its table's queries. Every read filters out soft-deleted
/// rows; nothing here issues a `DELETE`.
///
/// # Models
///
/// - `user`: User accounts and the user directory
/// - `project`: Projects, listings, detail and export views
/// - `membership`: Non-owner access to projects
/// - `task`: Project tasks and per-status analytics
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "John Doe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod task;
pub mod user;

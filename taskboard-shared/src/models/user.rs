/// User model and database operations
///
/// Users own projects and join other projects through memberships.
/// Passwords are stored as Argon2id hashes and never leave this module's
/// row type: everything sent over the wire goes through [`UserProfile`] or
/// [`UserRef`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
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
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "jane@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the unique constraint on `users.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// User row as stored in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash in PHC format
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, without the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Compact user reference embedded in project, membership and task views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Sortable columns of the user directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSortField {
    Name,
    Email,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl UserSortField {
    /// Column the field sorts by
    pub fn column(&self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::CreatedAt => "created_at",
            UserSortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, ordering and window for a user directory page
#[derive(Debug, Clone, Default)]
pub struct UserSearch {
    /// Case-insensitive substring matched against the name
    pub search: Option<String>,
    pub sort_by: UserSortField,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`EMAIL_UNIQUE_CONSTRAINT`] if the
    /// email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether an email address is already registered
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Lists one page of the user directory, excluding `caller`
    ///
    /// Ordering is by the requested column with `id` as a tiebreaker so
    /// pages are stable.
    pub async fn search(
        pool: &PgPool,
        caller: Uuid,
        params: &UserSearch,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        // Column and direction come from closed enums, never from input text.
        let sql = format!(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            WHERE id <> $1
              AND ($2::TEXT IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY {} {}, id
            LIMIT $3 OFFSET $4
            "#,
            params.sort_by.column(),
            params.sort_order.as_sql(),
        );

        let users = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(caller)
            .bind(params.search.as_deref())
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    /// Counts the users [`User::search`] pages over
    pub async fn count_search(
        pool: &PgPool,
        caller: Uuid,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE id <> $1
              AND ($2::TEXT IS NULL OR strpos(lower(name), lower($2)) > 0)
            "#,
        )
        .bind(caller)
        .bind(search)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_drops_password_hash() {
        let user = sample_user();
        let id = user.id;

        let json = serde_json::to_value(UserProfile::from(user)).unwrap();

        assert_eq!(json["id"], serde_json::json!(id));
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_sort_field_parsing() {
        let field: UserSortField = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(field.column(), "created_at");

        let field: UserSortField = serde_json::from_str("\"name\"").unwrap();
        assert_eq!(field.column(), "name");

        assert!(serde_json::from_str::<UserSortField>("\"password_hash\"").is_err());
    }

    #[test]
    fn test_sort_defaults() {
        assert_eq!(UserSortField::default(), UserSortField::CreatedAt);
        assert_eq!(SortOrder::default().as_sql(), "DESC");

        let order: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(order.as_sql(), "ASC");
    }
}

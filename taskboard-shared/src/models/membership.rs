/// Membership model and database operations
///
/// A membership grants a non-owner user access to a project. Memberships are
/// soft-deleted on removal and restored on re-invite: the unique constraint
/// on `(user_id, project_id)` covers deleted rows as well, so a user has at
/// most one membership row per project for the lifetime of the project.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     project_id UUID NOT NULL REFERENCES projects(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     CONSTRAINT memberships_user_project_key UNIQUE (user_id, project_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::membership::{InviteOutcome, Membership};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// match Membership::upsert_active(&pool, project_id, user_id).await? {
///     Some((membership, InviteOutcome::Created)) => println!("invited {}", membership.id),
///     Some((membership, InviteOutcome::Restored)) => println!("restored {}", membership.id),
///     None => println!("already a member"),
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRef;

/// Membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// How an invite was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteOutcome {
    /// A new membership row was inserted
    Created,

    /// A soft-deleted membership row was brought back
    Restored,
}

/// Member listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    /// Membership ID
    pub id: Uuid,
    pub user: UserRef,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    id: Uuid,
    user_id: Uuid,
    project_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    inserted: bool,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
}

impl From<MemberRow> for MemberView {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            user: UserRef {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at,
        }
    }
}

impl Membership {
    /// Makes `user_id` an active member of `project_id` in one statement
    ///
    /// Inserts a new row, or clears `deleted_at` on an existing soft-deleted
    /// row. If an active membership already exists the conflict clause
    /// matches nothing and `None` is returned.
    pub async fn upsert_active(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<(Self, InviteOutcome)>, sqlx::Error> {
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO memberships (user_id, project_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, project_id) DO UPDATE
            SET deleted_at = NULL, updated_at = NOW()
            WHERE memberships.deleted_at IS NOT NULL
            RETURNING id, user_id, project_id, created_at, updated_at, deleted_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|row| {
            let outcome = if row.inserted {
                InviteOutcome::Created
            } else {
                InviteOutcome::Restored
            };

            let membership = Membership {
                id: row.id,
                user_id: row.user_id,
                project_id: row.project_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: row.deleted_at,
            };

            (membership, outcome)
        }))
    }

    /// Finds the live membership of a user in a project
    pub async fn find_active(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, project_id, created_at, updated_at, deleted_at
            FROM memberships
            WHERE project_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks if a user holds a live membership in a project
    pub async fn is_active_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE project_id = $1 AND user_id = $2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists live members of a project, oldest first
    pub async fn list_active(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<MemberView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT m.id, m.created_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1 AND m.deleted_at IS NULL
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(MemberView::from).collect())
    }

    /// Soft-deletes a live membership
    ///
    /// Returns false if there was no live membership to remove.
    pub async fn soft_delete(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE project_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

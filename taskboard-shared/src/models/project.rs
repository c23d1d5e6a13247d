/// Project model and database operations
///
/// A project has exactly one owner and any number of members. Projects are
/// never removed from the table: deletion stamps `deleted_at` on the
/// project and, in the same transaction, on its live tasks and memberships.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX projects_owner_title_live_key
///     ON projects (owner_id, title)
///     WHERE deleted_at IS NULL;
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     owner_id,
///     title: "Alpha".to_string(),
///     description: None,
/// }).await?;
///
/// let visible = Project::list_accessible(&pool, owner_id).await?;
/// assert!(visible.iter().any(|p| p.project.id == project.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::{MemberView, Membership};
use super::task::{Task, TaskWithAssignee};
use super::user::UserRef;

/// Name of the partial unique index on live `(owner_id, title)` pairs
pub const OWNER_TITLE_UNIQUE_INDEX: &str = "projects_owner_title_live_key";

/// Project row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. Rows with a value here are invisible to every read.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Partial project update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Live row counts attached to a project listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCounts {
    pub memberships: i64,
    pub tasks: i64,
}

/// Project listing entry: the project, its owner, and live counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub owner: UserRef,
    #[serde(rename = "_count")]
    pub count: ProjectCounts,
}

/// A project together with its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWithOwner {
    #[serde(flatten)]
    pub project: Project,
    pub owner: UserRef,
}

/// A membership as embedded in project detail views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user: UserRef,
}

impl From<MemberView> for ProjectMember {
    fn from(view: MemberView) -> Self {
        Self { user: view.user }
    }
}

/// Project with owner and live members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub owner: UserRef,
    pub memberships: Vec<ProjectMember>,
}

/// Full project graph offered as a JSON download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectExport {
    #[serde(flatten)]
    pub detail: ProjectDetail,
    pub tasks: Vec<TaskWithAssignee>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_name: String,
    owner_email: String,
    membership_count: i64,
    task_count: i64,
}

impl From<SummaryRow> for ProjectSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            owner: UserRef {
                id: row.owner_id,
                name: row.owner_name,
                email: row.owner_email,
            },
            project: Project {
                id: row.id,
                title: row.title,
                description: row.description,
                owner_id: row.owner_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: None,
            },
            count: ProjectCounts {
                memberships: row.membership_count,
                tasks: row.task_count,
            },
        }
    }
}

impl Project {
    /// Returns true if the project has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Creates a new project
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`OWNER_TITLE_UNIQUE_INDEX`] if the
    /// owner already has a live project with this title.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a live project by ID
    pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at, deleted_at
            FROM projects
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists live projects the user owns or is an active member of
    ///
    /// Most recently updated first.
    pub async fn list_accessible(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT p.id, p.title, p.description, p.owner_id, p.created_at, p.updated_at,
                   u.name AS owner_name, u.email AS owner_email,
                   (SELECT COUNT(*) FROM memberships m
                     WHERE m.project_id = p.id AND m.deleted_at IS NULL) AS membership_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.project_id = p.id AND t.deleted_at IS NULL) AS task_count
            FROM projects p
            JOIN users u ON u.id = p.owner_id
            WHERE p.deleted_at IS NULL
              AND (p.owner_id = $1
                   OR EXISTS (SELECT 1 FROM memberships m
                               WHERE m.project_id = p.id
                                 AND m.user_id = $1
                                 AND m.deleted_at IS NULL))
            ORDER BY p.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ProjectSummary::from).collect())
    }

    /// Checks whether `owner_id` already has a live project titled `title`
    ///
    /// `exclude` skips one project, so a rename can be checked against every
    /// project except the one being renamed.
    pub async fn title_taken(
        pool: &PgPool,
        owner_id: Uuid,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects
                WHERE owner_id = $1
                  AND title = $2
                  AND deleted_at IS NULL
                  AND ($3::UUID IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(exclude)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Applies a partial update to a live project
    ///
    /// Returns `None` if the project does not exist or is deleted.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, description, owner_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Soft-deletes a project with its live tasks and memberships
    ///
    /// All three updates share one transaction. Returns false if the project
    /// was already deleted or never existed; nothing is touched in that case.
    pub async fn soft_delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let tasks = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE project_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let memberships = sqlx::query(
            r#"
            UPDATE memberships
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE project_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            project_id = %id,
            tasks = tasks.rows_affected(),
            memberships = memberships.rows_affected(),
            "Cascaded project soft delete"
        );

        Ok(true)
    }

    /// Loads the owner reference for this project
    pub async fn owner(&self, pool: &PgPool) -> Result<UserRef, sqlx::Error> {
        sqlx::query_as::<_, UserRef>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(self.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Attaches the owner to this project
    pub async fn with_owner(self, pool: &PgPool) -> Result<ProjectWithOwner, sqlx::Error> {
        let owner = self.owner(pool).await?;
        Ok(ProjectWithOwner {
            project: self,
            owner,
        })
    }

    /// Expands this project into its detail view
    pub async fn detail(self, pool: &PgPool) -> Result<ProjectDetail, sqlx::Error> {
        let owner = self.owner(pool).await?;
        let memberships = Membership::list_active(pool, self.id)
            .await?
            .into_iter()
            .map(ProjectMember::from)
            .collect();

        Ok(ProjectDetail {
            project: self,
            owner,
            memberships,
        })
    }

    /// Expands this project into its export graph
    pub async fn export(self, pool: &PgPool) -> Result<ProjectExport, sqlx::Error> {
        let tasks = Task::list_by_project(pool, self.id).await?;
        let detail = self.detail(pool).await?;

        Ok(ProjectExport { detail, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Alpha".to_string(),
            description: Some("First project".to_string()),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_project_serializes_camel_case_without_deleted_at() {
        let project = sample_project();
        let json = serde_json::to_value(&project).unwrap();

        assert_eq!(json["ownerId"], serde_json::json!(project.owner_id));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("deletedAt").is_none());
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn test_summary_shape() {
        let project = sample_project();
        let summary = ProjectSummary {
            owner: UserRef {
                id: project.owner_id,
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
            },
            project,
            count: ProjectCounts {
                memberships: 2,
                tasks: 5,
            },
        };

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["title"], "Alpha");
        assert_eq!(json["owner"]["name"], "Owner");
        assert_eq!(json["_count"]["memberships"], 2);
        assert_eq!(json["_count"]["tasks"], 5);
    }

    #[test]
    fn test_is_deleted() {
        let mut project = sample_project();
        assert!(!project.is_deleted());

        project.deleted_at = Some(Utc::now());
        assert!(project.is_deleted());
    }
}

/// Task model and database operations
///
/// Tasks belong to a project and move through a three-column workflow.
/// Any status may move to any other; there is no enforced order.
///
/// # Status
///
/// ```text
/// TODO ⇄ IN_PROGRESS ⇄ DONE
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'TODO',
///     project_id UUID NOT NULL REFERENCES projects(id),
///     assignee_id UUID REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Write docs".to_string(),
///     description: None,
///     assignee_id: None,
/// }).await?;
///
/// Task::update(&pool, task.id, UpdateTask {
///     status: Some(TaskStatus::InProgress),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRef;

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub project_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a task. New tasks always start in `TODO`.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
}

/// Partial task update
///
/// `None` leaves a column unchanged. For the assignee, `Some(None)` clears
/// it and `Some(Some(id))` reassigns.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Option<Uuid>>,
}

/// Task with its assignee expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Option<UserRef>,
}

/// Project reference embedded in task detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub title: String,
}

/// Task with assignee and owning project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskWithAssignee,
    pub project: ProjectRef,
}

/// Live task counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    pub total: i64,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    project_id: Uuid,
    assignee_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_name: Option<String>,
    assignee_email: Option<String>,
    project_title: String,
}

impl TaskRow {
    fn into_parts(self) -> (TaskWithAssignee, ProjectRef) {
        let assignee = match (self.assignee_id, self.assignee_name, self.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef { id, name, email }),
            _ => None,
        };

        let project = ProjectRef {
            id: self.project_id,
            title: self.project_title,
        };

        let task = Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            project_id: self.project_id,
            assignee_id: self.assignee_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: None,
        };

        (TaskWithAssignee { task, assignee }, project)
    }
}

const TASK_ROW_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.project_id, t.assignee_id,
           t.created_at, t.updated_at,
           u.name AS assignee_name, u.email AS assignee_email,
           p.title AS project_title
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    LEFT JOIN users u ON u.id = t.assignee_id
"#;

impl Task {
    /// Creates a task in `TODO`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, assignee_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, project_id, assignee_id,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a live task by ID
    pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, project_id, assignee_id,
                   created_at, updated_at, deleted_at
            FROM tasks
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists live tasks of a project with assignees, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let sql = format!(
            "{} WHERE t.project_id = $1 AND t.deleted_at IS NULL ORDER BY t.created_at DESC",
            TASK_ROW_SELECT
        );

        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.into_parts().0).collect())
    }

    /// Loads a live task with its assignee and project
    pub async fn detail(pool: &PgPool, id: Uuid) -> Result<Option<TaskDetail>, sqlx::Error> {
        let sql = format!("{} WHERE t.id = $1 AND t.deleted_at IS NULL", TASK_ROW_SELECT);

        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|row| {
            let (task, project) = row.into_parts();
            TaskDetail { task, project }
        }))
    }

    /// Applies a partial update to a live task
    ///
    /// Returns `None` if the task does not exist or is deleted.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (assignee_set, assignee_id) = match data.assignee_id {
            Some(value) => (true, value),
            None => (false, None),
        };

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                assignee_id = CASE WHEN $5 THEN $6 ELSE assignee_id END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, description, status, project_id, assignee_id,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(assignee_set)
        .bind(assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Soft-deletes a live task
    ///
    /// Returns false if the task was already deleted.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts live tasks of a project per status in one query
    pub async fn count_by_status(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<StatusCounts, sqlx::Error> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'TODO') AS todo,
                   COUNT(*) FILTER (WHERE status = 'IN_PROGRESS') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'DONE') AS done,
                   COUNT(*) AS total
            FROM tasks
            WHERE project_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}

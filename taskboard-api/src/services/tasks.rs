/// Tasks within a project
///
/// Every call re-checks that the caller is the owner or an active member of
/// the task's live project.

use sqlx::PgPool;
use taskboard_shared::auth::access::{
    is_project_participant, require_project_access, require_task_access, AccessError,
};
use taskboard_shared::models::project::Project;
use taskboard_shared::models::task::{CreateTask, Task, TaskDetail, TaskWithAssignee, UpdateTask};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::MessageResponse;

const FORBIDDEN: &str = "Forbidden";

#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
}

impl TaskService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, caller: Uuid, project_id: Uuid) -> ApiResult<Vec<TaskWithAssignee>> {
        require_project_access(&self.db, project_id, caller)
            .await
            .map_err(|e| ApiError::denied_as(e, FORBIDDEN))?;

        Ok(Task::list_by_project(&self.db, project_id).await?)
    }

    pub async fn create(
        &self,
        caller: Uuid,
        project_id: Uuid,
        title: String,
        description: Option<String>,
        assignee_id: Option<Uuid>,
    ) -> ApiResult<Task> {
        let (project, _) = require_project_access(&self.db, project_id, caller)
            .await
            .map_err(|e| ApiError::denied_as(e, FORBIDDEN))?;

        if let Some(assignee_id) = assignee_id {
            self.require_assignable(&project, assignee_id).await?;
        }

        let task = Task::create(
            &self.db,
            CreateTask {
                project_id,
                title,
                description,
                assignee_id,
            },
        )
        .await?;

        tracing::info!(task_id = %task.id, %project_id, "Task created");
        Ok(task)
    }

    /// Task detail; a task the caller cannot see is reported as missing
    pub async fn get(&self, caller: Uuid, task_id: Uuid) -> ApiResult<TaskDetail> {
        let not_found = || ApiError::NotFound("Task not found".to_string());

        match require_task_access(&self.db, task_id, caller).await {
            Ok(_) => {}
            Err(AccessError::TaskDenied) => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        Task::detail(&self.db, task_id).await?.ok_or_else(not_found)
    }

    pub async fn update(&self, caller: Uuid, task_id: Uuid, changes: UpdateTask) -> ApiResult<Task> {
        let task = require_task_access(&self.db, task_id, caller)
            .await
            .map_err(|e| ApiError::denied_as(e, FORBIDDEN))?;

        if let Some(Some(assignee_id)) = changes.assignee_id {
            let (project, _) = require_project_access(&self.db, task.project_id, caller)
                .await
                .map_err(|e| ApiError::denied_as(e, FORBIDDEN))?;
            self.require_assignable(&project, assignee_id).await?;
        }

        let updated = Task::update(&self.db, task_id, changes)
            .await?
            .ok_or_else(|| ApiError::Forbidden(FORBIDDEN.to_string()))?;

        tracing::info!(%task_id, status = updated.status.as_str(), "Task updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller: Uuid, task_id: Uuid) -> ApiResult<MessageResponse> {
        require_task_access(&self.db, task_id, caller)
            .await
            .map_err(|e| ApiError::denied_as(e, FORBIDDEN))?;

        if !Task::soft_delete(&self.db, task_id).await? {
            return Err(ApiError::Forbidden(FORBIDDEN.to_string()));
        }

        tracing::info!(%task_id, "Task deleted");
        Ok(MessageResponse::new("Task deleted successfully"))
    }

    async fn require_assignable(&self, project: &Project, assignee_id: Uuid) -> ApiResult<()> {
        if !is_project_participant(&self.db, project, assignee_id).await? {
            return Err(ApiError::BadRequest(
                "Assignee must be a member of this project".to_string(),
            ));
        }
        Ok(())
    }
}

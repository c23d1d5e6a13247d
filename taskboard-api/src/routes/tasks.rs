/// Task endpoints
///
/// - `GET /projects/:id/tasks` - Live tasks of a project, newest first
/// - `POST /projects/:id/tasks` - Create a task
/// - `GET /tasks/:id` - Task with assignee and project
/// - `PATCH /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Soft delete

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ValidatedJson},
    services::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Deserializer};
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::task::{Task, TaskDetail, TaskStatus, TaskWithAssignee, UpdateTask};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    /// Must be the project owner or an active member
    pub assignee_id: Option<Uuid>,
}

/// Partial task update
///
/// `assigneeId` distinguishes absent (unchanged) from `null` (unassign).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,
}

/// Marks a field that appeared in the body, even as `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            assignee_id: req.assignee_id,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<TaskWithAssignee>>> {
    Ok(Json(state.tasks.list(auth.user_id, project_id).await?))
}

/// Creates a task in `TODO`
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the assignee is not part of the project
/// - `403 Forbidden`: Caller cannot access the project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state
        .tasks
        .create(
            auth.user_id,
            project_id,
            req.title,
            req.description,
            req.assignee_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Returns 404 for tasks the caller cannot see
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    Ok(Json(state.tasks.get(auth.user_id, id).await?))
}

/// Updates only the fields present in the body
///
/// ```text
/// PATCH /tasks/:id
///
/// { "status": "IN_PROGRESS" }
/// ```
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.update(auth.user_id, id, req.into()).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.tasks.delete(auth.user_id, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> UpdateTask {
        serde_json::from_str::<UpdateTaskRequest>(body).unwrap().into()
    }

    #[test]
    fn test_assignee_absent_null_and_set() {
        assert_eq!(parse(r#"{"status":"DONE"}"#).assignee_id, None);
        assert_eq!(parse(r#"{"assigneeId":null}"#).assignee_id, Some(None));

        let id = Uuid::new_v4();
        let body = format!(r#"{{"assigneeId":"{}"}}"#, id);
        assert_eq!(parse(&body).assignee_id, Some(Some(id)));
    }

    #[test]
    fn test_status_only_patch() {
        let update = parse(r#"{"status":"IN_PROGRESS"}"#);

        assert_eq!(update.status, Some(TaskStatus::InProgress));
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{"status":"BLOCKED"}"#).is_err());
    }

    #[test]
    fn test_empty_title_fails_validation() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title":""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_titles_fail_validation() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title":"   "}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title":"  "}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateTaskRequest = serde_json::from_str(r#"{"title":" Write docs "}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.title, "Write docs");
    }
}

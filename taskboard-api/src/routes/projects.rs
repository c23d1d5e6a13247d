/// Project endpoints
///
/// All endpoints require JWT authentication.
///
/// # Endpoints
///
/// - `GET /projects` - Projects the caller owns or belongs to
/// - `POST /projects` - Create a project
/// - `GET /projects/:id` - Project with owner and members
/// - `PATCH /projects/:id` - Rename or re-describe (owner only)
/// - `DELETE /projects/:id` - Soft delete with its tasks and memberships (owner only)
/// - `POST /projects/:id/members` - Invite by email (owner only)
/// - `GET /projects/:id/members` - Live members
/// - `DELETE /projects/:id/members/:user_id` - Remove a member (owner only)
/// - `GET /projects/:id/analytics` - Task counts per status
/// - `GET /projects/:id/export` - Whole project as a JSON download

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ValidatedJson},
    services::{
        projects::{export_filename, InviteResponse},
        MessageResponse,
    },
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::membership::MemberView;
use taskboard_shared::models::project::{
    Project, ProjectDetail, ProjectSummary, ProjectWithOwner, UpdateProject,
};
use taskboard_shared::models::task::StatusCounts;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Partial project update; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    Ok(Json(state.projects.list(auth.user_id).await?))
}

/// Creates a project owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the caller already owns a
///   live project with this title
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectWithOwner>)> {
    let project = state
        .projects
        .create(auth.user_id, req.title, req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(state.projects.get(auth.user_id, id).await?))
}

/// Updates title and/or description
///
/// # Errors
///
/// - `400 Bad Request`: The new title is used by another of the caller's projects
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Project missing or deleted
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let changes = UpdateProject {
        title: req.title,
        description: req.description,
    };

    Ok(Json(state.projects.update(auth.user_id, id, changes).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.projects.delete(auth.user_id, id).await?))
}

/// Invites an existing user by email
///
/// Re-inviting a removed member restores their membership, reported as
/// `"action": "restored"`.
///
/// # Errors
///
/// - `400 Bad Request`: Inviting yourself, or the user is already a member
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Project missing, or no user has this email
pub async fn invite_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<InviteResponse>)> {
    let response = state.projects.invite(auth.user_id, id, &req.email).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<MemberView>>> {
    Ok(Json(state.projects.members(auth.user_id, id).await?))
}

/// Removes a member; the owner can never be removed
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(
        state.projects.remove_member(auth.user_id, id, user_id).await?,
    ))
}

pub async fn analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<StatusCounts>> {
    Ok(Json(state.projects.analytics(auth.user_id, id).await?))
}

/// Downloads the project graph as pretty-printed JSON
///
/// The response carries `Content-Disposition: attachment;
/// filename="project-<id>.json"`.
pub async fn export_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    let export = state.projects.export(auth.user_id, id).await?;

    let body = serde_json::to_string_pretty(&export)
        .map_err(|e| ApiError::InternalError(format!("Export serialization failed: {}", e)))?;

    let disposition = format!("attachment; filename=\"{}\"", export_filename(id));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

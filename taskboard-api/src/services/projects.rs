/// Projects, memberships, analytics and export
///
/// Visibility: the owner and active members see a project. Administration
/// (update, delete, invite, remove) is owner-only, and those checks report a
/// missing project (404) before a non-owner caller (403).

use serde::Serialize;
use sqlx::PgPool;
use taskboard_shared::auth::access::{require_project_access, require_project_owner};
use taskboard_shared::models::membership::{InviteOutcome, MemberView, Membership};
use taskboard_shared::models::project::{
    CreateProject, Project, ProjectDetail, ProjectExport, ProjectSummary, ProjectWithOwner,
    UpdateProject, OWNER_TITLE_UNIQUE_INDEX,
};
use taskboard_shared::models::task::{StatusCounts, Task};
use taskboard_shared::models::user::User;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::MessageResponse;

const TITLE_ALREADY_USED: &str = "Project title already used";

/// Result of an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub message: String,
    pub action: InviteOutcome,
    pub membership_id: Uuid,
}

impl InviteResponse {
    fn new(membership_id: Uuid, action: InviteOutcome) -> Self {
        let message = match action {
            InviteOutcome::Created => "User invited successfully",
            InviteOutcome::Restored => "User re-invited successfully",
        };

        Self {
            message: message.to_string(),
            action,
            membership_id,
        }
    }
}

#[derive(Clone)]
pub struct ProjectService {
    db: PgPool,
}

impl ProjectService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, caller: Uuid) -> ApiResult<Vec<ProjectSummary>> {
        Ok(Project::list_accessible(&self.db, caller).await?)
    }

    pub async fn create(
        &self,
        caller: Uuid,
        title: String,
        description: Option<String>,
    ) -> ApiResult<ProjectWithOwner> {
        if Project::title_taken(&self.db, caller, &title, None).await? {
            return Err(ApiError::BadRequest(
                "You already have a project with this title".to_string(),
            ));
        }

        let project = Project::create(
            &self.db,
            CreateProject {
                owner_id: caller,
                title,
                description,
            },
        )
        .await?;

        tracing::info!(project_id = %project.id, owner_id = %caller, "Project created");
        Ok(project.with_owner(&self.db).await?)
    }

    pub async fn get(&self, caller: Uuid, project_id: Uuid) -> ApiResult<ProjectDetail> {
        let (project, _) = require_project_access(&self.db, project_id, caller).await?;
        Ok(project.detail(&self.db).await?)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        project_id: Uuid,
        changes: UpdateProject,
    ) -> ApiResult<Project> {
        require_project_owner(&self.db, project_id, caller).await?;

        if let Some(title) = changes.title.as_deref() {
            if Project::title_taken(&self.db, caller, title, Some(project_id)).await? {
                return Err(ApiError::BadRequest(TITLE_ALREADY_USED.to_string()));
            }
        }

        let project = Project::update(&self.db, project_id, changes)
            .await
            .map_err(rename_conflict)?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        tracing::info!(%project_id, "Project updated");
        Ok(project)
    }

    pub async fn delete(&self, caller: Uuid, project_id: Uuid) -> ApiResult<MessageResponse> {
        require_project_owner(&self.db, project_id, caller).await?;

        if !Project::soft_delete_cascade(&self.db, project_id).await? {
            return Err(ApiError::NotFound("Project not found".to_string()));
        }

        tracing::info!(%project_id, "Project deleted");
        Ok(MessageResponse::new("Delete project success"))
    }

    /// Grants an existing user access to the project
    ///
    /// A previously removed member gets their old membership row back.
    pub async fn invite(
        &self,
        caller: Uuid,
        project_id: Uuid,
        email: &str,
    ) -> ApiResult<InviteResponse> {
        let project = require_project_owner(&self.db, project_id, caller).await?;

        let invitee = User::find_by_email(&self.db, email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User with this email not found".to_string()))?;

        if invitee.id == project.owner_id {
            return Err(ApiError::BadRequest("Cannot invite yourself".to_string()));
        }

        let (membership, outcome) = Membership::upsert_active(&self.db, project_id, invitee.id)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest("User is already a member of this project".to_string())
            })?;

        tracing::info!(
            %project_id,
            user_id = %invitee.id,
            action = ?outcome,
            "Member invited"
        );
        Ok(InviteResponse::new(membership.id, outcome))
    }

    pub async fn members(&self, caller: Uuid, project_id: Uuid) -> ApiResult<Vec<MemberView>> {
        require_project_access(&self.db, project_id, caller)
            .await
            .map_err(|e| ApiError::denied_as(e, "Project not found"))?;

        Ok(Membership::list_active(&self.db, project_id).await?)
    }

    pub async fn remove_member(
        &self,
        caller: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> ApiResult<MessageResponse> {
        let project = require_project_owner(&self.db, project_id, caller).await?;

        if user_id == project.owner_id {
            return Err(ApiError::BadRequest("Cannot remove owner".to_string()));
        }

        if !Membership::soft_delete(&self.db, project_id, user_id).await? {
            return Err(ApiError::NotFound("User is not a member".to_string()));
        }

        tracing::info!(%project_id, %user_id, "Member removed");
        Ok(MessageResponse::new("Member removed successfully"))
    }

    pub async fn analytics(&self, caller: Uuid, project_id: Uuid) -> ApiResult<StatusCounts> {
        require_project_access(&self.db, project_id, caller).await?;
        Ok(Task::count_by_status(&self.db, project_id).await?)
    }

    pub async fn export(&self, caller: Uuid, project_id: Uuid) -> ApiResult<ProjectExport> {
        let (project, _) = require_project_access(&self.db, project_id, caller).await?;
        Ok(project.export(&self.db).await?)
    }
}

/// File name offered for a project export download
pub fn export_filename(project_id: Uuid) -> String {
    format!("project-{}.json", project_id)
}

/// A rename that loses the race to the unique index reads like the pre-check
fn rename_conflict(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                && db_err.constraint() == Some(OWNER_TITLE_UNIQUE_INDEX) =>
        {
            ApiError::BadRequest(TITLE_ALREADY_USED.to_string())
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug)]
    struct UniqueViolation(&'static str);

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint \"{}\"", self.0)
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.0)
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    fn violation(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(UniqueViolation(constraint)))
    }

    #[test]
    fn test_rename_race_matches_precheck_message() {
        match rename_conflict(violation(OWNER_TITLE_UNIQUE_INDEX)) {
            ApiError::BadRequest(message) => assert_eq!(message, "Project title already used"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_keep_default_mapping() {
        assert!(matches!(
            rename_conflict(sqlx::Error::RowNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            rename_conflict(violation("some_other_key")),
            ApiError::InternalError(_)
        ));
    }

    #[test]
    fn test_invite_response_wording() {
        let id = Uuid::new_v4();

        let created = InviteResponse::new(id, InviteOutcome::Created);
        assert_eq!(created.message, "User invited successfully");

        let restored = serde_json::to_value(InviteResponse::new(id, InviteOutcome::Restored)).unwrap();
        assert_eq!(restored["message"], "User re-invited successfully");
        assert_eq!(restored["action"], "restored");
        assert_eq!(restored["membershipId"], id.to_string());
    }

    #[test]
    fn test_export_filename() {
        let id = Uuid::nil();
        assert_eq!(
            export_filename(id),
            "project-00000000-0000-0000-0000-000000000000.json"
        );
    }
}

/// Project and task access rules
///
/// # Permission Model
///
/// 1. **Visibility**: A user sees a project iff it is live and the user is
///    its owner or holds a live membership.
/// 2. **Ownership**: Only the owner may update or delete the project and
///    manage its members.
/// 3. **Tasks**: A task is reachable iff it is live and its project is
///    visible to the caller. This is re-checked on every call.
///
/// Denials never reveal whether a project exists: a missing project and an
/// invisible one produce the same [`AccessError::Denied`]. Owner-only
/// operations are the exception and report [`AccessError::ProjectNotFound`]
/// before [`AccessError::NotOwner`].
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::access::{require_project_access, ProjectRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let (project, role) = require_project_access(&pool, project_id, user_id).await?;
/// if role == ProjectRole::Owner {
///     println!("{} is yours", project.title);
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::Membership;
use crate::models::project::Project;
use crate::models::task::Task;

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Project is missing or soft-deleted (owner-only operations)
    #[error("Project not found")]
    ProjectNotFound,

    /// Caller is not the project owner
    #[error("Caller is not the project owner")]
    NotOwner,

    /// Project is missing, deleted, or not visible to the caller
    #[error("Project not found or access denied")]
    Denied,

    /// Task is missing, deleted, or in a project not visible to the caller
    #[error("Task not found or access denied")]
    TaskDenied,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The caller's relationship to a visible project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRole {
    Owner,
    Member,
}

impl ProjectRole {
    pub fn is_owner(&self) -> bool {
        matches!(self, ProjectRole::Owner)
    }
}

/// Decides a user's role on a project from already-loaded facts
///
/// Returns `None` when the project is deleted or the user is neither the
/// owner nor an active member.
pub fn role_for(project: &Project, user_id: Uuid, has_active_membership: bool) -> Option<ProjectRole> {
    if project.is_deleted() {
        return None;
    }

    if project.owner_id == user_id {
        Some(ProjectRole::Owner)
    } else if has_active_membership {
        Some(ProjectRole::Member)
    } else {
        None
    }
}

/// Checks that the caller owns an already-loaded project
pub fn require_ownership(project: &Project, user_id: Uuid) -> Result<(), AccessError> {
    if project.owner_id != user_id {
        return Err(AccessError::NotOwner);
    }

    Ok(())
}

/// Loads a project the caller may see
///
/// # Errors
///
/// Returns `AccessError::Denied` if the project is missing, deleted, or the
/// caller is neither owner nor active member.
pub async fn require_project_access(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(Project, ProjectRole), AccessError> {
    let project = Project::find_active(pool, project_id)
        .await?
        .ok_or(AccessError::Denied)?;

    let is_member = project.owner_id != user_id
        && Membership::is_active_member(pool, project_id, user_id).await?;

    match role_for(&project, user_id, is_member) {
        Some(role) => Ok((project, role)),
        None => {
            tracing::warn!(%project_id, %user_id, "Project access denied");
            Err(AccessError::Denied)
        }
    }
}

/// Loads a project the caller owns
///
/// # Errors
///
/// Returns `AccessError::ProjectNotFound` if the project is missing or
/// deleted, then `AccessError::NotOwner` if someone else owns it.
pub async fn require_project_owner(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AccessError> {
    let project = Project::find_active(pool, project_id)
        .await?
        .ok_or(AccessError::ProjectNotFound)?;

    if let Err(e) = require_ownership(&project, user_id) {
        tracing::warn!(%project_id, %user_id, "Owner-only operation denied");
        return Err(e);
    }

    Ok(project)
}

/// Loads a task the caller may touch
///
/// # Errors
///
/// Returns `AccessError::TaskDenied` if the task is missing or deleted, or
/// its project is not visible to the caller.
pub async fn require_task_access(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, AccessError> {
    let task = Task::find_active(pool, task_id)
        .await?
        .ok_or(AccessError::TaskDenied)?;

    match require_project_access(pool, task.project_id, user_id).await {
        Ok(_) => Ok(task),
        Err(AccessError::Denied) => Err(AccessError::TaskDenied),
        Err(e) => Err(e),
    }
}

/// Checks whether a user is the owner or an active member of a project
///
/// Used to validate task assignees.
pub async fn is_project_participant(
    pool: &PgPool,
    project: &Project,
    user_id: Uuid,
) -> Result<bool, AccessError> {
    if project.owner_id == user_id {
        return Ok(true);
    }

    Ok(Membership::is_active_member(pool, project.id, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project_owned_by(owner_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Alpha".to_string(),
            description: None,
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_owner_role() {
        let owner = Uuid::new_v4();
        let project = project_owned_by(owner);

        assert_eq!(role_for(&project, owner, false), Some(ProjectRole::Owner));
        // A stray membership row for the owner does not change the role.
        assert_eq!(role_for(&project, owner, true), Some(ProjectRole::Owner));
    }

    #[test]
    fn test_member_role() {
        let project = project_owned_by(Uuid::new_v4());
        let member = Uuid::new_v4();

        assert_eq!(role_for(&project, member, true), Some(ProjectRole::Member));
        assert!(!ProjectRole::Member.is_owner());
    }

    #[test]
    fn test_outsider_has_no_role() {
        let project = project_owned_by(Uuid::new_v4());

        assert_eq!(role_for(&project, Uuid::new_v4(), false), None);
    }

    #[test]
    fn test_deleted_project_hides_everyone() {
        let owner = Uuid::new_v4();
        let mut project = project_owned_by(owner);
        project.deleted_at = Some(Utc::now());

        assert_eq!(role_for(&project, owner, false), None);
        assert_eq!(role_for(&project, Uuid::new_v4(), true), None);
    }

    #[test]
    fn test_require_ownership() {
        let owner = Uuid::new_v4();
        let project = project_owned_by(owner);

        assert!(require_ownership(&project, owner).is_ok());
        assert!(matches!(
            require_ownership(&project, Uuid::new_v4()),
            Err(AccessError::NotOwner)
        ));
    }
}

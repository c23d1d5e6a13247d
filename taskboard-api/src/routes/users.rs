/// User directory endpoints
///
/// - `GET /users` - Paginated list of other users
/// - `GET /users/me` - Caller's profile

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedQuery,
    services::users::{PageRequest, Paginated, DEFAULT_PAGE, DEFAULT_TAKE},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::user::{SortOrder, UserProfile, UserSortField};
use validator::Validate;

/// Query string for `GET /users`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "take must be between 1 and 100"))]
    pub take: Option<i64>,

    /// `name`, `email`, `createdAt` or `updatedAt`
    pub sort_by: Option<UserSortField>,

    /// `asc` or `desc`
    pub sort_order: Option<SortOrder>,

    /// Case-insensitive name fragment
    pub search: Option<String>,
}

impl From<ListUsersQuery> for PageRequest {
    fn from(query: ListUsersQuery) -> Self {
        Self {
            page: query.page.unwrap_or(DEFAULT_PAGE),
            take: query.take.unwrap_or(DEFAULT_TAKE),
            sort_by: query.sort_by.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
            search: query.search,
        }
    }
}

/// Lists users other than the caller
///
/// ```text
/// GET /users?page=1&take=5&sortBy=name&sortOrder=asc&search=ada
/// ```
///
/// Response: `{ "data": [UserProfile], "meta": { "page", "take", "total" } }`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> ApiResult<Json<Paginated<UserProfile>>> {
    let page = state.users.list(auth.user_id, query.into()).await?;
    Ok(Json(page))
}

/// Returns the caller's profile, or 404 if the account is gone
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.me(auth.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let request = PageRequest::from(ListUsersQuery::default());
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_query_parses_camel_case() {
        let query: ListUsersQuery =
            serde_json::from_str(r#"{"page":2,"take":10,"sortBy":"updatedAt","sortOrder":"asc"}"#)
                .unwrap();
        let request = PageRequest::from(query);

        assert_eq!(request.page, 2);
        assert_eq!(request.take, 10);
        assert_eq!(request.sort_by, UserSortField::UpdatedAt);
        assert_eq!(request.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_take_is_capped() {
        let query = ListUsersQuery {
            take: Some(101),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }
}

/// User directory and profile lookups
use serde::Serialize;
use sqlx::PgPool;
use taskboard_shared::models::user::{SortOrder, User, UserProfile, UserSearch, UserSortField};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_TAKE: i64 = 5;
pub const MAX_TAKE: i64 = 100;

/// A resolved directory page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub take: i64,
    pub sort_by: UserSortField,
    pub sort_order: SortOrder,
    pub search: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            take: DEFAULT_TAKE,
            sort_by: UserSortField::default(),
            sort_order: SortOrder::default(),
            search: None,
        }
    }
}

impl PageRequest {
    /// Rows to skip; a page past `i64` range is a 400
    fn offset(&self) -> ApiResult<i64> {
        (self.page - 1)
            .checked_mul(self.take)
            .ok_or_else(|| ApiError::BadRequest("page is out of range".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub take: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// One page of every user except the caller
    pub async fn list(&self, caller: Uuid, request: PageRequest) -> ApiResult<Paginated<UserProfile>> {
        // Blank search text means no filter.
        let search = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let params = UserSearch {
            search,
            sort_by: request.sort_by,
            sort_order: request.sort_order,
            limit: request.take,
            offset: request.offset()?,
        };

        let data = User::search(&self.db, caller, &params).await?;
        let total = User::count_search(&self.db, caller, params.search.as_deref()).await?;

        tracing::debug!(%caller, total, page = request.page, "Listed users");

        Ok(Paginated {
            data,
            meta: PageMeta {
                page: request.page,
                take: request.take,
                total,
            },
        })
    }

    pub async fn me(&self, caller: Uuid) -> ApiResult<UserProfile> {
        User::find_by_id(&self.db, caller)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_page() {
        let request = PageRequest {
            page: 3,
            take: 10,
            ..Default::default()
        };
        assert_eq!(request.offset().unwrap(), 20);
        assert_eq!(PageRequest::default().offset().unwrap(), 0);
    }

    #[test]
    fn test_offset_overflow_is_bad_request() {
        let request = PageRequest {
            page: i64::MAX,
            take: MAX_TAKE,
            ..Default::default()
        };
        assert!(matches!(request.offset(), Err(ApiError::BadRequest(_))));

        let last = PageRequest {
            page: i64::MAX / MAX_TAKE,
            take: MAX_TAKE,
            ..Default::default()
        };
        assert!(last.offset().is_ok());
    }

    #[test]
    fn test_paginated_shape() {
        let page = Paginated::<UserProfile> {
            data: vec![],
            meta: PageMeta {
                page: 1,
                take: 5,
                total: 0,
            },
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [], "meta": { "page": 1, "take": 5, "total": 0 } }));
    }
}

/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login` - Exchange credentials for an access token

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedJson,
    services::auth::LoginResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskboard_shared::models::user::UserProfile;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password, checked for strength by the service
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User registration endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the new user's profile:
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "createdAt": "2025-06-01T12:00:00Z",
///   "updatedAt": "2025-06-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, weak password, or email taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state
        .auth
        .register(req.name, req.email, req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// User login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// The user's profile plus `accessToken`, a bearer JWT.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the credentials do not match.
///   Unknown emails and wrong passwords get the same message.
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.auth.login(&req.email, req.password).await?;
    Ok(Json(response))
}

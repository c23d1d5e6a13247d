/// Registration and login
use chrono::Duration;
use serde::Serialize;
use sqlx::PgPool;
use taskboard_shared::auth::{jwt, password};
use taskboard_shared::models::user::{CreateUser, User, UserProfile};

use crate::config::JwtConfig;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};

/// Returned for both an unknown email and a wrong password
pub const INVALID_CREDENTIALS: &str = "Your email or password is incorrect";

/// Successful login: the profile plus a bearer token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub access_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `ValidationError` on `password` if it is too weak
    /// - `BadRequest("Email already exists")` if the email is registered
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> ApiResult<UserProfile> {
        if let Err(message) = password::validate_password_strength(&password) {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "password".to_string(),
                message,
            }]));
        }

        if User::email_exists(&self.db, &email).await? {
            return Err(ApiError::BadRequest("Email already exists".to_string()));
        }

        let password_hash = password::hash_password_blocking(password).await?;

        // A concurrent registration surfaces as the same 400 via the
        // email constraint mapping.
        let user = User::create(
            &self.db,
            CreateUser {
                name,
                email,
                password_hash,
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Checks credentials and issues an access token
    ///
    /// # Errors
    ///
    /// `BadRequest` with [`INVALID_CREDENTIALS`] for any credential mismatch.
    pub async fn login(&self, email: &str, password: String) -> ApiResult<LoginResponse> {
        let Some(user) = User::find_by_email(&self.db, email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
        };

        let valid = password::verify_password_blocking(password, user.password_hash.clone()).await?;
        if !valid {
            tracing::warn!(user_id = %user.id, "Login with wrong password");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.issue_token(&user)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            user: user.into(),
            access_token,
        })
    }

    fn issue_token(&self, user: &User) -> ApiResult<String> {
        let claims = jwt::Claims::with_expiration(
            user.id,
            Duration::seconds(self.jwt.expires_in_seconds),
        );

        Ok(jwt::create_token(&claims, &self.jwt.secret)?)
    }
}

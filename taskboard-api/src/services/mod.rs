/// Business logic behind the route handlers
///
/// Each service owns a clone of the pool and enforces the access rules for
/// its resource. Handlers only extract, validate and shape responses.

pub mod auth;
pub mod projects;
pub mod tasks;
pub mod users;

pub use auth::AuthService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserService;

use serde::Serialize;

/// `{ "message": ... }` acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

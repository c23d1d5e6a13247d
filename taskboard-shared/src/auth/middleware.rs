/// Authenticated request context
///
/// The API's JWT layer validates the bearer token and inserts an
/// [`AuthContext`] into the request extensions. Handlers pull it back out
/// with Axum's `Extension` extractor and pass the user id down to the
/// services, which make every authorization decision from it.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::Claims;
/// use taskboard_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let ctx = AuthContext::from_claims(&Claims::new(user_id));
/// assert_eq!(ctx.user_id, user_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Identity of the caller for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.sub)
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Only the `Bearer` scheme is accepted. Returns `None` for any other
/// scheme or an empty token.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::from_claims(&Claims::new(user_id));

        assert_eq!(context, AuthContext::new(user_id));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}

//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and strength validation
//! - [`jwt`]: JWT access token generation and validation
//! - [`middleware`]: Request authentication context
//! - [`access`]: Owner/member visibility rules for projects and tasks
//!
//! # Example
//!
//! ```
//! use taskboard_shared::auth::password::{hash_password, verify_password};
//! use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let claims = Claims::new(Uuid::new_v4());
//! let token = create_token(&claims, "secret-key")?;
//! assert!(validate_token(&token, "secret-key").is_ok());
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod jwt;
pub mod middleware;
pub mod password;

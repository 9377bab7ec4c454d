//! Quill credential authority.
//!
//! Password hashing (Argon2id), bearer token issuance and verification
//! (HS256 JWT), and the login/password shape rules shared by registration
//! and login. Nothing in here touches storage.

pub mod error;
pub mod password;
pub mod token;
pub mod validate;

pub use error::{AuthError, HashingError, SigningError, ValidationError};
pub use password::{hash_password, verify_password};
pub use token::{Claims, issue_token, verify_token};
pub use validate::{validate_login, validate_password};

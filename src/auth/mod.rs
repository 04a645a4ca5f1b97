//! Accounts and session tokens
//!
//! Passwords are stored as bcrypt hashes; sessions are stateless HS256
//! tokens carrying the user id and role.

pub mod extractor;
pub mod password;
pub mod service;
pub mod token;

pub use extractor::{bearer_token, AuthUser, OptionalAuthUser};
pub use password::{hash_password, verify_password};
pub use service::{AuthService, AuthSession};
pub use token::{Claims, TokenIssuer};

//! Authentication core: password hashing, access tokens, credential
//! headers and authorization checks.

pub mod guard;
pub mod header;
pub mod jwt;
pub mod password;

pub use jwt::JwtService;
pub use password::PasswordHasher;

//! Authentication for the rallypoint platform
//!
//! Argon2id password hashing plus HS256 session tokens. The actor identity
//! the engine records on ledger entries is resolved from these tokens at the
//! API boundary.

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, SESSION_TOKEN_TYPE};
pub use password::{hash_password, verify_password, PasswordError};

/// Account security helpers: password hashing and input policies
pub mod password;
pub mod policy;

pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{normalize_email, validate_nickname, validate_password};

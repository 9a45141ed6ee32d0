pub mod password;
pub mod token;

pub use password::{hash_blocking, verify_blocking, verify_dummy_blocking, CredentialHasher};
pub use token::{Claims, TokenService, TOKEN_PREFIX};

pub mod directory;
pub mod memory;
pub mod models;
pub mod users;

pub use directory::{DirectoryError, UserDirectory};
pub use memory::InMemoryUserDirectory;
pub use models::{NewUser, User, UserCredentials};
pub use users::SqliteUserDirectory;

pub mod backup;
pub mod error;
pub mod manager;
pub mod schema;

pub use error::StorageError;
pub use manager::AccountManager;

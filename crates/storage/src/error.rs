use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("backup failed: {0}")]
    Backup(String),

    #[error("core error: {0}")]
    Core(#[from] accountfix_core::CoreError),
}

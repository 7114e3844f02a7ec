use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitabakError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid book: {0}")]
    InvalidBook(String),

    #[error("Reading stats not found for user: {0}")]
    RecordNotFound(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KitabakError>;

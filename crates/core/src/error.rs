use thiserror::Error;

pub type ShelfResult<T> = Result<T, ShelfError>;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ShelfError {
    pub fn user_not_found(user_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("user {user_id}"))
    }

    pub fn book_not_found(book_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("book {book_id}"))
    }
}

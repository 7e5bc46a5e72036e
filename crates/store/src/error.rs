#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid title: {0}")]
    InvalidTitle(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Asset not found: {0}")]
    AssetNotFound(uuid::Uuid),

    #[error("Import run not found: {0}")]
    RunNotFound(uuid::Uuid),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid asset status: {0}")]
    InvalidStatus(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Invalid run status: {0}")]
    InvalidRunStatus(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

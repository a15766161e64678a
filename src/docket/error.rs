use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DocketError {
    #[error("Folder not found: {0}")]
    NodeNotFound(String),

    #[error("Intake entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Finalized document not found: {0}")]
    DocumentNotFound(Uuid),

    #[error("Invalid folder structure: {0}")]
    InvalidImport(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, DocketError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskzError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(u64),

    #[error("Invalid data format: {0}")]
    Format(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TaskzError {
    /// Errors caused by the caller's input, as opposed to the storage medium.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TaskzError::Validation(_) | TaskzError::NotFound(_) | TaskzError::Format(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TaskzError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("corrupt collection at {location}: {reason}")]
    Corrupt { location: String, reason: String },
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Errors caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool { matches!(self, Self::Model(_)) }
}

// Service-level error taxonomy
use crate::domain::error::ValidationError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} with uuid {uuid} not found")]
    NotFound { entity: &'static str, uuid: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("you can only modify your own dashboards")]
    Forbidden,

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, uuid: Uuid) -> Self {
        ServiceError::NotFound { entity, uuid }
    }
}

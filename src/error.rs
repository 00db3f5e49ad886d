use thiserror::Error;

use crate::admin::AdminError;
use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::storage::StorageError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Admin(#[from] AdminError),
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("You need to log in first.")]
    NotLoggedIn,
    #[error("Roadmap not found: {0}")]
    UnknownRoadmap(String),
    #[error("Step {step_id} not found in roadmap {roadmap_id}")]
    UnknownStep { roadmap_id: String, step_id: String },
    #[error("Step {0} is locked. Complete the previous step to unlock it.")]
    StepLocked(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ServiceError {
    /// Whether the failure already reached the user as a notification.
    pub fn was_notified(&self) -> bool {
        matches!(
            self,
            ServiceError::Auth(_)
                | ServiceError::Admin(_)
                | ServiceError::NotLoggedIn
                | ServiceError::UnknownRoadmap(_)
                | ServiceError::UnknownStep { .. }
                | ServiceError::StepLocked(_)
        )
    }
}

use skema_infra::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkemaError {
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("There was an unexpected value in the request: {0}")]
    UnexpectedValue(String),
    #[error("Unable to find the requested resource: {0}")]
    NotFound(String),
    #[error("No access to the requested resource: {0}")]
    AccessDenied(String),
    #[error("The submitted event version is stale: {0}")]
    Conflict(String),
    #[error("The stored recurrence exceptions are inconsistent: {0}")]
    DataIntegrity(String),
    #[error("Internal server error")]
    InternalError,
}

impl From<StoreError> for SkemaError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found",
                event_id
            )),
            StoreError::AccessDenied(event_id) => {
                Self::AccessDenied(format!("The event with id: {}", event_id))
            }
            StoreError::Conflict { expected, got } => {
                Self::Conflict(format!("expected seq: {}, got: {}", expected, got))
            }
            StoreError::InvalidRecord(msg) => Self::BadClientData(msg),
            StoreError::Internal(_) => Self::InternalError,
        }
    }
}

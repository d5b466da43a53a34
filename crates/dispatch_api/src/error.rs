use dispatch_core::error::DispatchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire-level error code, the stable part of a failure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    InvalidTransition,
    ResourceExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::BadRequest(_) => ErrorCode::BadRequest,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            ApiError::ResourceExhausted(_) => ErrorCode::ResourceExhausted,
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::RideNotFound { .. } | DispatchError::DriverNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            DispatchError::InvalidRideTransition { .. }
            | DispatchError::InvalidDriverTransition { .. }
            | DispatchError::ResourceAlreadyAllocated { .. }
            | DispatchError::ResourceNotAllocated { .. } => {
                ApiError::InvalidTransition(err.to_string())
            }
            DispatchError::PortPoolExhausted => ApiError::ResourceExhausted(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::ecs::{DriverId, RideId, RideStatus};

    #[test]
    fn engine_errors_map_to_client_codes() {
        let not_found: ApiError = DispatchError::RideNotFound { id: RideId(5) }.into();
        assert_eq!(not_found.code(), ErrorCode::NotFound);

        let not_found: ApiError = DispatchError::DriverNotFound { id: DriverId(5) }.into();
        assert_eq!(not_found.code(), ErrorCode::NotFound);

        let invalid: ApiError = DispatchError::InvalidRideTransition {
            id: RideId(5),
            from: RideStatus::Pending,
            to: RideStatus::Completed,
        }
        .into();
        assert_eq!(invalid.code(), ErrorCode::InvalidTransition);

        let exhausted: ApiError = DispatchError::PortPoolExhausted.into();
        assert_eq!(exhausted.code(), ErrorCode::ResourceExhausted);
    }
}

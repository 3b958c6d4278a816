use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;
use crate::utils::response::error as error_response;
use crate::validation::FieldError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Domain(e) => match e {
                StoreError::CapacityExceeded => "EVENT_FULL",
                StoreError::InvalidTemporalState => "EVENT_IN_PAST",
                StoreError::EmptyParticipants => "NO_PARTICIPANTS",
                StoreError::ParticipantsExceedCapacity { .. } => "CAPACITY_EXCEEDED",
                StoreError::NotFound(_) => "NOT_FOUND",
            },
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(errors) => {
                warn!(error_count = errors.len(), "Validation failed");
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::Domain(e) => {
                warn!(code = self.code(), error = %e, "Business rule violation");
            }
            AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if e.is_domain() {
            AppError::Domain(e)
        } else {
            AppError::NotFound("Event not found".to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Internal details stay in the logs
        let (public_message, details) = match self {
            AppError::ValidationError(errors) => (
                "Validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => (msg, None),
            AppError::Domain(e) => (e.to_string(), None),
            AppError::InternalServerError(_) => ("An unexpected error occurred".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}

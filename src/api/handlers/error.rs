//! Mapping of [`ServiceError`] onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::{api::state::AppState, error::ServiceError};

pub const GENERIC_FAILURE: &str = "Unable to process request";

/// Body of every failed request.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// A [`ServiceError`] plus whether store failures may be shown verbatim.
#[derive(Debug)]
pub struct ApiError {
    error: ServiceError,
    expose_store_errors: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(error: ServiceError, expose_store_errors: bool) -> Self {
        Self {
            error,
            expose_store_errors,
        }
    }

    fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::Auth => StatusCode::UNAUTHORIZED,
            ServiceError::Validation(_)
            | ServiceError::Conflict(_)
            | ServiceError::Store(_)
            | ServiceError::Internal(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> String {
        match &self.error {
            ServiceError::Store(err) if self.expose_store_errors => err.to_string(),
            err if err.is_server_fault() => GENERIC_FAILURE.to_string(),
            err => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_server_fault() {
            error!("Request failed: {}", self.error);
        }
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl AppState {
    /// Wrap `error` for the response, honouring the store error exposure setting.
    #[must_use]
    pub fn reject(&self, error: ServiceError) -> ApiError {
        ApiError::new(error, self.config().expose_store_errors())
    }
}

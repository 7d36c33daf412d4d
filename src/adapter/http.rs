//! # HTTP Adapter
//!
//! HTTP status mapping and response body for pipe errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipe::PipeError;

impl PipeError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request: the payload failed validation
            PipeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PipeError::Validation { .. } => StatusCode::BAD_REQUEST,
            PipeError::Custom(_) => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error: the declarations themselves
            // are broken, not the request
            PipeError::Derive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<PipeError> for ErrorResponse {
    fn from(err: PipeError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for PipeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

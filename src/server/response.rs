//! Response envelope shared by every endpoint.
//!
//! Bodies look like `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": "..."}`.

use crate::error::StatsError;
use crate::models::ResponseStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn with_status(status: ResponseStatus, data: T) -> Json<Self> {
        Json(Self {
            status,
            data: Some(data),
            message: None,
        })
    }
}

/// Wrap `data` in a success envelope.
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Envelope::with_status(ResponseStatus::Success, data)
}

/// An error envelope with its HTTP status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: impl fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: impl fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed ({}): {}", self.status, self.message);

        let body = Envelope::<()> {
            status: ResponseStatus::Error,
            data: None,
            message: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<Json<Envelope<T>>, ApiError>;

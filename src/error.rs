use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every failure whose detail must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Message returned when a body or path parameter does not decode.
pub const MALFORMED_REQUEST_MESSAGE: &str = "Solicitud inválida";

/// ApiError
///
/// The single error taxonomy for the auth layer and the resource routes.
/// Client-facing variants map to a fixed status and message; the remaining
/// variants wrap infrastructure failures, which are logged and collapsed into a
/// generic 500 so no storage or hashing detail ever reaches the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Registration presented a code that is not in `codigos_acceso`.
    #[error("access code not found in registry")]
    InvalidAccessCode,
    /// An admin tried to assign a role outside the known set.
    #[error("role is not one of admin, therapist, patient")]
    InvalidRole,
    /// The body or path could not be decoded. The detail is kept for logs only.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// No principal is bound to the session.
    #[error("request has no authenticated session")]
    Unauthorized,
    /// A principal is bound but its role is not in the route's gate.
    #[error("role not permitted on this route")]
    Forbidden,
    /// Credentials did not match. Reported as a soft `success:false`.
    #[error("credentials rejected")]
    AuthFailed,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    /// The session layer was not installed on the router.
    #[error("session layer unavailable")]
    SessionUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAccessCode | ApiError::InvalidRole | ApiError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::AuthFailed => StatusCode::OK,
            ApiError::Database(_)
            | ApiError::Hashing(_)
            | ApiError::Session(_)
            | ApiError::Task(_)
            | ApiError::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text placed in the `error` field of the response body, if any.
    pub fn public_message(&self) -> Option<&'static str> {
        match self {
            ApiError::InvalidAccessCode => Some("Código de acceso inválido"),
            ApiError::InvalidRole => Some("Rol inválido"),
            ApiError::MalformedRequest(_) => Some(MALFORMED_REQUEST_MESSAGE),
            ApiError::Unauthorized => Some("No autorizado"),
            ApiError::Forbidden => Some("Acceso denegado"),
            ApiError::AuthFailed => None,
            _ => Some(INTERNAL_ERROR_MESSAGE),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match self.public_message() {
            Some(message) => json!({ "success": false, "error": message }),
            None => json!({ "success": false }),
        };

        (self.status(), Json(body)).into_response()
    }
}

//! HTTP mapping of mediator errors.

use a1_core::{A1Error, ErrorKind};
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

/// Wraps [`A1Error`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub A1Error);

impl From<A1Error> for ApiError {
    fn from(e: A1Error) -> Self {
        ApiError(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(A1Error::InvalidPath {
            reason: rejection.body_text(),
        })
    }
}

impl ApiError {
    /// Policy-type body that does not deserialize, reported as a schema error.
    pub fn malformed_definition(rejection: JsonRejection) -> Self {
        ApiError(A1Error::MalformedDefinition {
            reason: rejection.body_text(),
        })
    }

    /// Instance body that is not a JSON object, reported as a validation failure.
    pub fn malformed_payload(rejection: JsonRejection) -> Self {
        ApiError(A1Error::MalformedPayload {
            reason: rejection.body_text(),
        })
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InvalidSchema | ErrorKind::ValidationFailure => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::DispatchError => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            error!(error = %self.0, code = kind.as_str(), "Request failed");
        } else {
            debug!(error = %self.0, code = kind.as_str(), "Request rejected");
        }

        let body = Json(json!({
            "error": kind.as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

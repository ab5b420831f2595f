//! Mapping from registry errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use swiftcodes_shared::SwiftCodesError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`SwiftCodesError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub SwiftCodesError);

impl From<SwiftCodesError> for ApiError {
    fn from(err: SwiftCodesError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            SwiftCodesError::Validation { .. } | SwiftCodesError::Parse { .. } => {
                StatusCode::BAD_REQUEST
            }
            SwiftCodesError::NotFound { .. } => StatusCode::NOT_FOUND,
            SwiftCodesError::DuplicateCode { .. } => StatusCode::CONFLICT,
            SwiftCodesError::Config { .. }
            | SwiftCodesError::Storage(_)
            | SwiftCodesError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }

        // Internal details stay in the log.
        let message = match &self.0 {
            SwiftCodesError::Storage(_)
            | SwiftCodesError::Io { .. }
            | SwiftCodesError::Config { .. } => "internal storage failure".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (SwiftCodesError::validation("bad"), StatusCode::BAD_REQUEST),
            (SwiftCodesError::not_found("x"), StatusCode::NOT_FOUND),
            (
                SwiftCodesError::DuplicateCode { code: "AAISALTRXXX".into() },
                StatusCode::CONFLICT,
            ),
            (
                SwiftCodesError::Storage("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}

use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use fragments_service::FragmentError;

/// Errors that can occur when running the fragments server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication failed (missing or invalid credentials).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A fragment operation failed.
    #[error(transparent)]
    Fragment(#[from] FragmentError),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Fragment(e) => fragment_status(e),
        }
    }
}

fn fragment_status(error: &FragmentError) -> StatusCode {
    match error {
        FragmentError::InvalidInput(_)
        | FragmentError::EmptyBody
        | FragmentError::InvalidContent(_)
        | FragmentError::TypeMismatch { .. } => StatusCode::BAD_REQUEST,
        FragmentError::NotFound(_) => StatusCode::NOT_FOUND,
        FragmentError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        FragmentError::UnsupportedType(_) | FragmentError::UnsupportedMediaType(_) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        FragmentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the `{"status":"error","error":{...}}` envelope.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "status": "error",
        "error": {
            "code": status.as_u16(),
            "message": message,
        },
    });
    (status, axum::Json(body)).into_response()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let mut response = error_response(status, &self.to_string());
        if matches!(self, Self::Unauthorized(_)) {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Basic realm=\"fragments\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use fragments_store::StoreError;

    use super::*;

    #[test]
    fn fragment_errors_map_to_statuses() {
        let cases = [
            (FragmentError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (FragmentError::EmptyBody, StatusCode::BAD_REQUEST),
            (FragmentError::InvalidContent("x".into()), StatusCode::BAD_REQUEST),
            (
                FragmentError::TypeMismatch {
                    expected: "text/plain".into(),
                    actual: "text/html".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (FragmentError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                FragmentError::TooLarge { size: 2, max: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                FragmentError::UnsupportedType("image/png".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                FragmentError::UnsupportedMediaType("bin".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                FragmentError::Storage(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ServerError::from(error).status(), expected);
        }
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = ServerError::Unauthorized("missing credentials".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));
    }
}

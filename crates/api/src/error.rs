use avatarcast_core::error::CoreError;
use avatarcast_vendor::VendorError;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for validation failures and [`VendorError`] for
/// upstream failures, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent `{ "error", "code" }` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `avatarcast_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed call to HeyGen or LiveAvatar.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Vendor errors ---
            AppError::Vendor(err) => classify_vendor_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a vendor error into an HTTP status, error code, and message.
///
/// - A vendor error status is relayed as-is with the vendor's message.
/// - A 2xx envelope reporting failure maps to 400.
/// - A malformed vendor response maps to 502.
/// - Transport failures map to 500 with a sanitized message.
fn classify_vendor_error(err: &VendorError) -> (StatusCode, &'static str, String) {
    match err {
        VendorError::Api { status, message } => {
            let status = StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (status, "VENDOR_ERROR", message.clone())
        }
        VendorError::Rejected(message) => {
            (StatusCode::BAD_REQUEST, "VENDOR_REJECTED", message.clone())
        }
        VendorError::MalformedResponse(detail) => {
            tracing::error!(%detail, "Malformed vendor response");
            (
                StatusCode::BAD_GATEWAY,
                "BAD_GATEWAY",
                "Unexpected response from upstream service".to_string(),
            )
        }
        VendorError::Request(e) => {
            tracing::error!(error = %e, "Vendor request failed");
            internal()
        }
    }
}

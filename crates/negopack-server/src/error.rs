use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use negopack_ai::AiError;
use negopack_core::NegoError;

// ---------------------------------------------------------------------------
// Internal sentinel for "AI not configured"
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 503 through
/// the `anyhow::Error` chain when no provider API key is configured.
#[derive(Debug)]
struct AiUnavailable;

impl std::fmt::Display for AiUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pack generation is not configured on this server")
    }
}

impl std::error::Error for AiUnavailable {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 401 Unauthorized error.
    pub fn unauthorized() -> Self {
        Self(NegoError::SessionNotFound.into())
    }

    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(NegoError::Validation(msg.into()).into())
    }

    /// Construct a 503 for pack generation without a configured provider.
    pub fn ai_unavailable() -> Self {
        Self(AiUnavailable.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.downcast_ref::<AiUnavailable>().is_some() {
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<AiError>() {
            // Provider failures are reported as a bad gateway, matching how
            // the UI treats a failed generation: retryable, not our fault.
            tracing::warn!(error = %e, "pack generation failed");
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<NegoError>() {
            match e {
                NegoError::InvalidCredentials
                | NegoError::SessionNotFound
                | NegoError::SessionExpired => StatusCode::UNAUTHORIZED,
                NegoError::Forbidden(_) => StatusCode::FORBIDDEN,
                NegoError::DealNotFound(_)
                | NegoError::SupplierNotFound(_)
                | NegoError::UserNotFound(_)
                | NegoError::PackNotFound(_)
                | NegoError::NotesNotFound(_) => StatusCode::NOT_FOUND,
                NegoError::Validation(_)
                | NegoError::InvalidStatus(_)
                | NegoError::InvalidAction(_)
                | NegoError::InvalidPricingModel(_)
                | NegoError::InvalidRole(_)
                | NegoError::Constraint(_)
                | NegoError::ResetTokenInvalid => StatusCode::BAD_REQUEST,
                NegoError::EditLocked { .. } | NegoError::InvalidTransition { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                NegoError::Conflict { .. } => StatusCode::CONFLICT,
                NegoError::PasswordHash(_) | NegoError::Sqlite(_) | NegoError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

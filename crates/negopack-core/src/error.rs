use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegoError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session not found")]
    SessionNotFound,

    #[error("session expired: sign in again")]
    SessionExpired,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("deal is locked for editing while status is '{status}'")]
    EditLocked { status: String },

    #[error("invalid transition '{action}' from '{from}': {reason}")]
    InvalidTransition {
        from: String,
        action: String,
        reason: String,
    },

    #[error("status changed concurrently: expected '{expected}', found '{actual}'")]
    Conflict { expected: String, actual: String },

    #[error("deal not found: {0}")]
    DealNotFound(String),

    #[error("supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("no negotiation pack for deal: {0}")]
    PackNotFound(String),

    #[error("no meeting notes for deal: {0}")]
    NotesNotFound(String),

    #[error("password reset token is invalid or expired")]
    ResetTokenInvalid,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid transition action: {0}")]
    InvalidAction(String),

    #[error("invalid pricing model: {0}")]
    InvalidPricingModel(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NegoError>;

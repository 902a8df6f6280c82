use axum::extract::State;
use axum::Json;

use negopack_core::types::Role;

use crate::auth::{CurrentSession, CurrentUser};
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SignupBody {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /api/auth/signup — register and open a session.
pub async fn signup(
    State(app): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let (profile, session) = blocking(move || {
        store.sign_up(
            &body.full_name,
            &body.email,
            &body.password,
            body.role.unwrap_or(Role::Employee),
        )
    })
    .await?;

    Ok(Json(serde_json::json!({
        "token": session.token,
        "profile": profile,
    })))
}

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login — verify credentials and open a session.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let (profile, session) = blocking(move || store.sign_in(&body.email, &body.password)).await?;

    Ok(Json(serde_json::json!({
        "token": session.token,
        "profile": profile,
    })))
}

/// POST /api/auth/logout — revoke the calling session.
pub async fn logout(
    State(app): State<AppState>,
    session: CurrentSession,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    blocking(move || store.sign_out(&session.token)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /api/auth/me — the calling user's profile.
pub async fn me(CurrentUser(profile): CurrentUser) -> Json<serde_json::Value> {
    Json(serde_json::json!(profile))
}

/// GET /api/users — every profile, for attendee pickers and author display.
pub async fn list_users(
    State(app): State<AppState>,
    CurrentUser(_profile): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let users = blocking(move || store.list_profiles()).await?;
    Ok(Json(serde_json::json!(users)))
}

#[derive(serde::Deserialize)]
pub struct ProfileBody {
    pub full_name: String,
}

/// PUT /api/auth/profile — update display name.
pub async fn update_profile(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(body): Json<ProfileBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let updated = blocking(move || store.update_profile(&profile, &body.full_name)).await?;
    Ok(Json(serde_json::json!(updated)))
}

#[derive(serde::Deserialize)]
pub struct PasswordBody {
    pub old_password: String,
    pub new_password: String,
}

/// POST /api/auth/password — change password after re-checking the old one.
pub async fn change_password(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(body): Json<PasswordBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    blocking(move || store.change_password(&profile, &body.old_password, &body.new_password))
        .await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(serde::Deserialize)]
pub struct ResetRequestBody {
    pub email: String,
}

/// POST /api/auth/reset/request — issue a reset token.
///
/// Always answers `ok` so the endpoint cannot be used to probe which
/// addresses have accounts. The token itself only appears in the server log.
pub async fn reset_request(
    State(app): State<AppState>,
    Json(body): Json<ResetRequestBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let email = body.email.clone();
    let reset = blocking(move || store.request_password_reset(&body.email)).await?;

    if let Some(reset) = reset {
        tracing::info!(email = %email, token = %reset.token, "password reset token issued");
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(serde::Deserialize)]
pub struct ResetConfirmBody {
    pub token: String,
    pub new_password: String,
}

/// POST /api/auth/reset/confirm — consume a reset token and set a new password.
pub async fn reset_confirm(
    State(app): State<AppState>,
    Json(body): Json<ResetConfirmBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    blocking(move || store.confirm_password_reset(&body.token, &body.new_password)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use negopack_core::account::Profile;

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved from a `Authorization: Bearer <token>`
/// session header. Handlers take this extractor to require a signed-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Profile);

/// The raw session token alongside the profile, for endpoints that act on
/// the session itself (logout).
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub profile: Profile,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn resolve(state: &AppState, parts: &Parts) -> Result<(Profile, String), AppError> {
    let Some(token) = bearer_token(parts) else {
        return Err(AppError::unauthorized());
    };
    let store = state.store.clone();
    let lookup = token.clone();
    let profile = tokio::task::spawn_blocking(move || store.session_profile(&lookup))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((profile, token))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (profile, _) = resolve(state, parts).await?;
        Ok(CurrentUser(profile))
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (profile, token) = resolve(state, parts).await?;
        Ok(CurrentSession { profile, token })
    }
}

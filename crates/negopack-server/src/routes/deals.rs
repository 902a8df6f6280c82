use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use negopack_core::deal::DealIntake;
use negopack_core::types::{DealStatus, TransitionAction};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/deals — deals visible to the caller, newest first.
pub async fn list_deals(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deals = blocking(move || store.list_deals(&profile)).await?;
    Ok(Json(serde_json::json!(deals)))
}

/// POST /api/deals — create a draft from intake fields.
pub async fn create_deal(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(intake): Json<DealIntake>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deal = blocking(move || store.create_deal(&profile, intake)).await?;
    Ok(Json(serde_json::json!(deal)))
}

/// GET /api/deals/:id — a single deal, if visible.
pub async fn get_deal(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deal = blocking(move || store.get_deal(&profile, id)).await?;
    Ok(Json(serde_json::json!(deal)))
}

/// PUT /api/deals/:id — replace intake fields while the status allows it.
pub async fn update_deal(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(intake): Json<DealIntake>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deal = blocking(move || store.update_intake(&profile, id, intake)).await?;
    Ok(Json(serde_json::json!(deal)))
}

/// DELETE /api/deals/:id — remove a deal and its dependents.
pub async fn delete_deal(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    blocking(move || store.delete_deal(&profile, id)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(serde::Deserialize)]
pub struct TransitionBody {
    pub action: TransitionAction,
    #[serde(default)]
    pub feedback: Option<String>,
    /// Status the client last saw; a mismatch is answered with 409 instead
    /// of applying the action to a deal someone else already moved.
    #[serde(default)]
    pub expected_status: Option<DealStatus>,
}

/// POST /api/deals/:id/transition — apply a lifecycle action.
pub async fn transition_deal(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deal = blocking(move || {
        store.transition(
            &profile,
            id,
            body.action,
            body.feedback.as_deref(),
            body.expected_status,
        )
    })
    .await?;
    Ok(Json(serde_json::json!(deal)))
}

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use negopack_core::supplier::SupplierInput;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/suppliers — all suppliers, shared across the organization.
pub async fn list_suppliers(
    State(app): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let suppliers = blocking(move || store.list_suppliers()).await?;
    Ok(Json(serde_json::json!(suppliers)))
}

/// POST /api/suppliers — create a supplier owned by the caller.
pub async fn create_supplier(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(input): Json<SupplierInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let supplier = blocking(move || store.create_supplier(&profile, input)).await?;
    Ok(Json(serde_json::json!(supplier)))
}

/// PUT /api/suppliers/:id — update a supplier (owner or admin).
pub async fn update_supplier(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let supplier = blocking(move || store.update_supplier(&profile, id, input)).await?;
    Ok(Json(serde_json::json!(supplier)))
}

/// DELETE /api/suppliers/:id — remove a supplier with no deals.
pub async fn delete_supplier(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    blocking(move || store.delete_supplier(&profile, id)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

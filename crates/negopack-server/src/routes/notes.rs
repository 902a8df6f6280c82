use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use negopack_core::meeting::MeetingNotesInput;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/deals/:id/notes — the meeting notes for a deal.
pub async fn get_notes(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let notes = blocking(move || store.get_meeting_notes(&profile, id)).await?;
    Ok(Json(serde_json::json!(notes)))
}

/// PUT /api/deals/:id/notes — save meeting notes. Saving against an
/// `approved` deal advances it to `meeting_done`.
pub async fn put_notes(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<MeetingNotesInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let (notes, status) = blocking(move || store.upsert_meeting_notes(&profile, id, input)).await?;
    Ok(Json(serde_json::json!({
        "notes": notes,
        "status": status,
    })))
}

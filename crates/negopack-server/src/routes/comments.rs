use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/deals/:id/comments — stakeholder comments, newest first.
pub async fn list_comments(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let comments = blocking(move || store.list_comments(&profile, id)).await?;
    Ok(Json(serde_json::json!(comments)))
}

#[derive(serde::Deserialize)]
pub struct CommentBody {
    pub comment: String,
    #[serde(default)]
    pub section: Option<String>,
}

/// POST /api/deals/:id/comments — add a comment and fan it out to
/// subscribed SSE clients.
pub async fn add_comment(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CommentBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let comment = blocking(move || {
        store.add_comment(
            &profile,
            id,
            &body.comment,
            body.section.as_deref().unwrap_or("general"),
        )
    })
    .await?;

    // Nobody listening is fine.
    let _ = app.comment_tx.send(comment.clone());

    Ok(Json(serde_json::json!(comment)))
}

/// GET /api/deals/:id/comments/events — SSE stream of new comments on one
/// deal. The visibility check runs once at subscription time; ownership is
/// immutable, but the stream outlives a deleted deal. That stream only goes
/// quiet: comment writes re-check the deal, so nothing is published for a
/// deal id that no longer exists.
pub async fn comment_events(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let store = app.store.clone();
    blocking(move || store.get_deal(&profile, id).map(|_| ())).await?;

    let rx = app.comment_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| {
        msg.ok().filter(|c| c.deal_id == id).map(|c| {
            let data = serde_json::to_string(&c).unwrap_or_default();
            Ok::<Event, Infallible>(Event::default().event("comment").data(data))
        })
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

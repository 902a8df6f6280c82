use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use negopack_ai::PackInput;
use negopack_core::pack::{NegotiationPack, Tradeable};
use negopack_core::policy;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/deals/:id/pack — the stored pack for a deal.
pub async fn get_pack(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let pack = blocking(move || store.get_pack(&profile, id)).await?;
    Ok(Json(serde_json::json!(pack)))
}

/// POST /api/deals/:id/pack/generate — ask the provider for a fresh pack
/// and store it. On a deal's first pack this also moves `draft` to
/// `pack_generated`.
pub async fn generate_pack(
    State(app): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(ai) = app.ai.clone() else {
        return Err(AppError::ai_unavailable());
    };

    // Authorization is checked before the provider call so a forbidden
    // request never spends tokens.
    let store = app.store.clone();
    let actor = profile.clone();
    let (deal, supplier) = blocking(move || {
        let deal = store.get_deal(&actor, id)?;
        policy::ensure_can_generate(&actor, &deal)?;
        let supplier = store.get_supplier(deal.supplier_id)?;
        Ok((deal, supplier))
    })
    .await?;

    let input = PackInput {
        supplier_name: supplier.name,
        title: deal.title,
        scope: deal.scope,
        pricing_model: deal.pricing_model.label().to_string(),
        key_issues: deal.key_issues,
        desired_outcomes: deal.desired_outcomes,
        deal_value: deal.deal_value,
    };
    let generated = ai.generate_pack(&input).await.map_err(AppError::from)?;

    let pack = NegotiationPack {
        deal_id: id,
        targets: generated.targets,
        red_lines: generated.red_lines,
        tradeables: generated
            .tradeables
            .into_iter()
            .map(|t| Tradeable {
                we_give: t.we_give,
                we_get: t.we_get,
            })
            .collect(),
        batna: generated.batna,
        questions: generated.questions,
        meeting_agenda: generated.meeting_agenda,
        generated_at: Utc::now(),
    };

    let store = app.store.clone();
    let (pack, status) = blocking(move || store.record_generated_pack(&profile, id, pack)).await?;

    Ok(Json(serde_json::json!({
        "pack": pack,
        "status": status,
    })))
}

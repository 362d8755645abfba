//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, PlanResponse, SlotRecord, SlotsQuery, SummaryRecord};

/// Returns the summary and every slot row.
///
/// `GET /plan` → 200 + `PlanResponse` JSON
pub async fn get_plan(State(state): State<Arc<AppState>>) -> Json<PlanResponse> {
    Json(PlanResponse {
        summary: SummaryRecord::from(&state.summary),
        slots: state.plan.rows().map(SlotRecord::from).collect(),
    })
}

/// Returns slot rows, optionally filtered to one lineup.
///
/// `GET /slots` → 200 + `Vec<SlotRecord>` JSON
/// `GET /slots?lineup=A01` → rows of lineup A01 (empty if unselected)
/// `GET /slots?lineup=Z99` → 404 + `ErrorResponse` for an id not in the catalog
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> impl IntoResponse {
    if let Some(id) = query.lineup.as_deref() {
        if state.topology.lineup(id).is_none() {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("unknown lineup \"{id}\""),
                }),
            ));
        }
    }

    let records: Vec<SlotRecord> = state
        .plan
        .rows()
        .filter(|r| {
            query
                .lineup
                .as_deref()
                .is_none_or(|id| r.slot.lineup_id == id)
        })
        .map(SlotRecord::from)
        .collect();

    Ok(Json(records))
}

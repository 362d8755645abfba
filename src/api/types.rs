//! API response and query types.
//!
//! Slot fields follow the CSV export columns.

use serde::{Deserialize, Serialize};

use crate::plan::engine::PlanRow;
use crate::plan::status::subfeed_share_kw;
use crate::plan::summary::PlanSummary;

/// Full plan: totals and every slot row.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub summary: SummaryRecord,
    pub slots: Vec<SlotRecord>,
}

/// Serializable totals view.
#[derive(Debug, Serialize)]
pub struct SummaryRecord {
    pub lineups_in_use: usize,
    pub pdus_in_use: usize,
    pub even_load_per_pdu_kw: f64,
    pub pdu_capacity_kw: f64,
    pub lineup_capacity_kw: f64,
    pub available_capacity_mw: f64,
    pub target_kw: f64,
    pub assigned_kw: f64,
    pub shortfall_kw: f64,
    /// `"Exceeds Target Load"` or `"Within Target Load"`.
    pub target_status: String,
    pub overloaded_slots: usize,
    pub saturated_lineups: Vec<String>,
}

impl From<&PlanSummary> for SummaryRecord {
    fn from(s: &PlanSummary) -> Self {
        Self {
            lineups_in_use: s.lineups_in_use,
            pdus_in_use: s.pdus_in_use,
            even_load_per_pdu_kw: s.even_load_per_pdu_kw,
            pdu_capacity_kw: s.pdu_capacity_kw,
            lineup_capacity_kw: s.lineup_capacity_kw,
            available_capacity_mw: s.available_capacity_mw,
            target_kw: s.target_kw,
            assigned_kw: s.assigned_kw,
            shortfall_kw: s.shortfall_kw,
            target_status: s.target_status.to_string(),
            overloaded_slots: s.overloaded_slots,
            saturated_lineups: s.saturated_lineups.clone(),
        }
    }
}

/// One slot of the plan.
///
/// `pdu` and `subfeed` are one-based, matching the slot label.
#[derive(Debug, Serialize)]
pub struct SlotRecord {
    /// Position in the plan's slot list.
    pub index: usize,
    /// Display label, e.g. `"A01-1"` or `"A01-1-S3"`.
    pub slot: String,
    pub lineup: String,
    pub pdu: usize,
    pub subfeed: Option<usize>,
    pub capacity_kw: f64,
    pub load_kw: f64,
    /// `"ok"` or `"overloaded"`.
    pub status: &'static str,
    pub lineup_saturated: bool,
    /// Even per-breaker split of a metered PDU-level slot.
    pub subfeed_share_kw: Option<f64>,
}

impl From<PlanRow<'_>> for SlotRecord {
    fn from(row: PlanRow<'_>) -> Self {
        Self {
            index: row.index,
            slot: row.slot.label(),
            lineup: row.slot.lineup_id.clone(),
            pdu: row.slot.pdu_index + 1,
            subfeed: row.slot.subfeed_index.map(|s| s + 1),
            capacity_kw: row.slot.capacity_kw,
            load_kw: row.load_kw,
            status: row.status.as_str(),
            lineup_saturated: row.lineup_saturated,
            subfeed_share_kw: match row.slot.subfeed_index {
                Some(_) => None,
                None => subfeed_share_kw(row.load_kw, row.slot.active_subfeeds),
            },
        }
    }
}

/// Query parameters for `GET /slots`.
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// Lineup id to filter on.
    pub lineup: Option<String>,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

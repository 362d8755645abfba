//! Health checks a presentation layer reads off a plan.

use std::fmt;

/// Per-slot health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Ok,
    /// Assigned load is above the slot ceiling (only reachable by manual edits).
    Overloaded,
}

impl SlotStatus {
    /// Classifies an assigned load against its slot ceiling.
    pub fn of(load_kw: f64, capacity_kw: f64) -> Self {
        if load_kw > capacity_kw {
            Self::Overloaded
        } else {
            Self::Ok
        }
    }

    /// Short name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Overloaded => "overloaded",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Overloaded => write!(f, "Overloaded"),
        }
    }
}

/// Comparison of the total assigned load against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// Sum is above the target.
    Exceeds,
    /// Sum is at or below the target.
    Within,
}

impl TargetStatus {
    /// Compares the assigned total with the target, both rounded to 2 dp.
    pub fn of(total_kw: f64, target_kw: f64) -> Self {
        if round_kw(total_kw) > round_kw(target_kw) {
            Self::Exceeds
        } else {
            Self::Within
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exceeds => write!(f, "Exceeds Target Load"),
            Self::Within => write!(f, "Within Target Load"),
        }
    }
}

/// Rounds a kW value to two decimal places for presentation.
pub fn round_kw(kw: f64) -> f64 {
    (kw * 100.0).round() / 100.0
}

/// Even per-breaker share of a PDU's load across its active subfeeds.
///
/// Returns `None` for an unmetered PDU.
pub fn subfeed_share_kw(pdu_load_kw: f64, active_subfeeds: usize) -> Option<f64> {
    (active_subfeeds > 0).then(|| pdu_load_kw / active_subfeeds as f64)
}

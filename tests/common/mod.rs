//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use lineup_planner::capacity::{RatingSet, TierCapacities};
use lineup_planner::plan::types::Slot;
use rand::Rng;
use rand::rngs::StdRng;

/// Ceiling of a 480 V / 1000 A / pf 1.0 / derate 0.8 breaker (kW).
pub const PDU_KW: f64 = 665.107_510_106_448_9;

/// Ceiling of a 415 V / 800 A / pf 1.0 / derate 1.0 subfeed breaker (kW).
pub const SUBFEED_KW: f64 = 575.040_868_112_867_2;

/// Floating tolerance for sums (kW).
pub const EPS: f64 = 1e-6;

/// Nameplate tiers: 415 V/800 A subfeeds, 480 V/1000 A/0.8 PDUs and lineups.
pub fn nameplate_tiers() -> TierCapacities {
    TierCapacities::from_ratings(
        &RatingSet::new(415.0, 800.0, 1.0, 1.0),
        &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
        &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
    )
}

/// PDU-level slot with an explicit capacity.
pub fn slot(lineup: &str, pdu_index: usize, capacity_kw: f64) -> Slot {
    Slot {
        lineup_id: lineup.to_string(),
        pdu_index,
        subfeed_index: None,
        active_subfeeds: 0,
        capacity_kw,
    }
}

/// Random slot list: 1-4 lineups of 1-4 slots, capacities in [-50, 700) kW.
pub fn random_slots(rng: &mut StdRng) -> Vec<Slot> {
    let lineups = rng.random_range(1..=4);
    let mut slots = Vec::new();
    for l in 0..lineups {
        let id = format!("L{l:02}");
        for p in 0..rng.random_range(1..=4) {
            let capacity = if rng.random_bool(0.1) {
                -50.0
            } else {
                rng.random_range(0.0..700.0)
            };
            slots.push(slot(&id, p, capacity));
        }
    }
    slots
}

/// Largest load the slots can carry under a per-lineup ceiling.
pub fn achievable_kw(slots: &[Slot], lineup_capacity_kw: f64) -> f64 {
    lineup_sums(slots, &vec![f64::NAN; slots.len()], |s, _| s.capacity_kw.max(0.0))
        .values()
        .map(|&sum| sum.min(lineup_capacity_kw.max(0.0)))
        .sum()
}

/// Sum of assigned load per lineup.
pub fn lineup_totals(slots: &[Slot], distribution: &[f64]) -> BTreeMap<String, f64> {
    lineup_sums(slots, distribution, |_, load| load)
}

fn lineup_sums(
    slots: &[Slot],
    distribution: &[f64],
    value: impl Fn(&Slot, f64) -> f64,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for (s, &load) in slots.iter().zip(distribution) {
        *totals.entry(s.lineup_id.clone()).or_insert(0.0) += value(s, load);
    }
    totals
}

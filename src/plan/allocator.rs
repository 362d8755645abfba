//! Bounded greedy round-robin load allocation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::types::{Allocation, Slot};

/// Largest increment one slot absorbs per pass (kW).
///
/// Bounding the step forces peers in the same pass to take turns instead of
/// the first slot filling to capacity.
pub const CHUNK_MAX_KW: f64 = 10.0;

/// Relative tolerance for declaring a lineup saturated.
pub const SATURATION_REL_TOLERANCE: f64 = 1e-9;

/// Whether a lineup total counts as full against `lineup_capacity_kw`.
///
/// The tolerance scales with the ceiling, floored at 1 kW, so rounding in
/// the last chunk never hides a full lineup.
pub fn is_saturated(total_kw: f64, lineup_capacity_kw: f64) -> bool {
    let tolerance = SATURATION_REL_TOLERANCE * lineup_capacity_kw.abs().max(1.0);
    total_kw >= lineup_capacity_kw - tolerance
}

/// Distributes `target_load_kw` across `slots` without exceeding any slot or
/// lineup ceiling.
///
/// Passes over the slot list in order, granting each slot at most
/// [`CHUNK_MAX_KW`] per pass, until the target is met or a full pass assigns
/// nothing. An infeasible target is not an error: the returned vector then
/// sums to less than the target and the caller compares it.
///
/// # Arguments
///
/// * `slots` - Ordered slot list from the resolver
/// * `target_load_kw` - Load to place (kW)
/// * `lineup_capacity_kw` - Aggregate ceiling applied to every lineup (kW)
///
/// # Returns
///
/// An [`Allocation`] whose distribution has one entry per slot.
///
/// # Examples
///
/// ```
/// use lineup_planner::plan::allocator::allocate;
/// use lineup_planner::plan::types::Slot;
///
/// let slot = |pdu_index| Slot {
///     lineup_id: "A01".to_string(),
///     pdu_index,
///     subfeed_index: None,
///     active_subfeeds: 0,
///     capacity_kw: 100.0,
/// };
/// let result = allocate(&[slot(0), slot(1)], 50.0, 150.0);
/// assert_eq!(result.distribution, vec![30.0, 20.0]);
/// assert!(result.saturated.is_empty());
/// ```
pub fn allocate(slots: &[Slot], target_load_kw: f64, lineup_capacity_kw: f64) -> Allocation {
    let mut distribution = vec![0.0_f64; slots.len()];
    let mut lineup_totals: BTreeMap<&str, f64> = BTreeMap::new();
    for slot in slots {
        lineup_totals.entry(slot.lineup_id.as_str()).or_insert(0.0);
    }

    let mut remaining = target_load_kw;
    let mut passes = 0_usize;

    while remaining > 0.0 && !slots.is_empty() {
        passes += 1;
        let mut progressed = false;

        for (i, slot) in slots.iter().enumerate() {
            // Negative capacities clamp to zero headroom.
            let capacity = slot.capacity_kw.max(0.0);
            let lineup_total = lineup_totals
                .get(slot.lineup_id.as_str())
                .copied()
                .unwrap_or(0.0);

            if distribution[i] >= capacity || lineup_total >= lineup_capacity_kw {
                continue;
            }

            let headroom = (capacity - distribution[i]).min(lineup_capacity_kw - lineup_total);
            if headroom <= 0.0 {
                continue;
            }

            let delta = headroom.min(remaining).min(CHUNK_MAX_KW);
            distribution[i] += delta;
            lineup_totals.insert(slot.lineup_id.as_str(), lineup_total + delta);
            remaining -= delta;
            progressed = true;

            if remaining <= 0.0 {
                break;
            }
        }

        if !progressed {
            break;
        }
    }

    let saturated: BTreeSet<String> = lineup_totals
        .iter()
        .filter(|&(_, &total)| is_saturated(total, lineup_capacity_kw))
        .map(|(&id, _)| id.to_string())
        .collect();

    debug!(
        slots = slots.len(),
        passes,
        target_kw = target_load_kw,
        shortfall_kw = remaining.max(0.0),
        saturated = saturated.len(),
        "allocation finished"
    );

    Allocation {
        distribution,
        saturated,
    }
}

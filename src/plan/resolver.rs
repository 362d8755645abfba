//! Expands a topology selection into the ordered slot list.

use crate::capacity::TierCapacities;

use super::topology::{Pdu, Topology};
use super::types::{Granularity, Slot, SubfeedPolicy};

/// Effective capacity of a PDU slot.
///
/// A PDU with metered subfeeds offers `active * subfeed_kw` (clamped to its
/// own main breaker under [`SubfeedPolicy::ClampToPdu`]); an unmetered PDU
/// offers its full main-breaker ceiling.
///
/// # Arguments
///
/// * `active_subfeeds` - Number of active subfeed breakers on the PDU
/// * `tiers` - Derived tier ceilings
/// * `policy` - Subfeed clamp policy
pub fn pdu_effective_capacity_kw(
    active_subfeeds: usize,
    tiers: &TierCapacities,
    policy: SubfeedPolicy,
) -> f64 {
    if active_subfeeds == 0 {
        return tiers.pdu_kw;
    }
    let metered = active_subfeeds as f64 * tiers.subfeed_kw;
    match policy {
        SubfeedPolicy::ClampToPdu => metered.min(tiers.pdu_kw),
        SubfeedPolicy::Unclamped => metered,
    }
}

/// Capacity of one subfeed slot on a PDU with `active_subfeeds` active.
///
/// Under [`SubfeedPolicy::ClampToPdu`] the PDU ceiling is shared evenly so
/// the subfeed slots of one PDU never sum past its main breaker.
fn subfeed_slot_capacity_kw(
    active_subfeeds: usize,
    tiers: &TierCapacities,
    policy: SubfeedPolicy,
) -> f64 {
    match policy {
        SubfeedPolicy::ClampToPdu => tiers
            .subfeed_kw
            .min(tiers.pdu_kw / active_subfeeds as f64),
        SubfeedPolicy::Unclamped => tiers.subfeed_kw,
    }
}

/// Builds the flat slot list for a topology.
///
/// Lineups are visited in catalog order (unselected ones skipped) and PDUs in
/// ascending index order; at subfeed granularity, breakers in ascending order
/// follow their PDU. A PDU with no active subfeed still yields a single
/// PDU-level slot at full capacity. The resulting order is the positional
/// contract for every distribution vector computed from it.
///
/// # Arguments
///
/// * `topology` - Catalog and selection
/// * `tiers` - Derived tier ceilings
/// * `granularity` - PDU or subfeed slots
/// * `policy` - Subfeed clamp policy
///
/// # Returns
///
/// The ordered slot list (empty when nothing is selected).
pub fn resolve(
    topology: &Topology,
    tiers: &TierCapacities,
    granularity: Granularity,
    policy: SubfeedPolicy,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    for lineup in topology.selected_lineups() {
        for pdu in lineup.active_pdus() {
            match granularity {
                Granularity::Pdu => slots.push(pdu_slot(&lineup.id, pdu, tiers, policy)),
                Granularity::Subfeed if pdu.active_subfeed_count() == 0 => {
                    slots.push(pdu_slot(&lineup.id, pdu, tiers, policy));
                }
                Granularity::Subfeed => {
                    let active = pdu.active_subfeed_count();
                    let capacity_kw = subfeed_slot_capacity_kw(active, tiers, policy);
                    slots.extend(pdu.active_subfeeds().map(|s| Slot {
                        lineup_id: lineup.id.clone(),
                        pdu_index: pdu.index,
                        subfeed_index: Some(s),
                        active_subfeeds: active,
                        capacity_kw,
                    }));
                }
            }
        }
    }
    slots
}

fn pdu_slot(lineup_id: &str, pdu: &Pdu, tiers: &TierCapacities, policy: SubfeedPolicy) -> Slot {
    let active = pdu.active_subfeed_count();
    Slot {
        lineup_id: lineup_id.to_string(),
        pdu_index: pdu.index,
        subfeed_index: None,
        active_subfeeds: active,
        capacity_kw: pdu_effective_capacity_kw(active, tiers, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::RatingSet;

    fn tiers() -> TierCapacities {
        TierCapacities::from_ratings(
            &RatingSet::new(415.0, 800.0, 1.0, 1.0),
            &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
            &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
        )
    }

    fn topology() -> Topology {
        Topology::from_catalog(&["A01", "A02", "B01"], 2)
    }

    #[test]
    fn empty_selection_yields_no_slots() {
        let slots = resolve(&topology(), &tiers(), Granularity::Pdu, SubfeedPolicy::default());
        assert!(slots.is_empty());
    }

    #[test]
    fn slots_follow_catalog_order_not_selection_order() {
        let topo = topology().with_selected(&["B01", "A01"]).unwrap();
        let slots = resolve(&topo, &tiers(), Granularity::Pdu, SubfeedPolicy::default());
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["A01-1", "A01-2", "B01-1", "B01-2"]);
    }

    #[test]
    fn deselected_pdu_is_skipped() {
        let mut topo = topology().with_selected(&["A01", "A02"]).unwrap();
        topo.toggle_pdu("A01", 0).unwrap();
        let slots = resolve(&topo, &tiers(), Granularity::Pdu, SubfeedPolicy::default());
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["A01-2", "A02-1", "A02-2"]);
    }

    #[test]
    fn unmetered_pdu_gets_full_capacity() {
        let t = tiers();
        let topo = topology().with_selected(&["A01"]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Pdu, SubfeedPolicy::default());
        assert!(slots.iter().all(|s| s.capacity_kw == t.pdu_kw));
    }

    #[test]
    fn metered_pdu_uses_subfeed_count() {
        let t = tiers();
        let mut topo = topology().with_selected(&["A01"]).unwrap();
        topo.set_subfeeds("A01", 1, &[0]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Pdu, SubfeedPolicy::default());
        assert_eq!(slots[0].capacity_kw, t.pdu_kw);
        assert_eq!(slots[1].capacity_kw, t.subfeed_kw);
        assert_eq!(slots[1].active_subfeeds, 1);
    }

    #[test]
    fn three_subfeeds_unclamped_exceed_pdu_ceiling() {
        let t = tiers();
        let mut topo = topology().with_selected(&["A01"]).unwrap();
        topo.set_subfeeds("A01", 0, &[0, 1, 2]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Pdu, SubfeedPolicy::Unclamped);
        assert!((slots[0].capacity_kw - 3.0 * t.subfeed_kw).abs() < 1e-9);
        assert!(slots[0].capacity_kw > t.pdu_kw);
    }

    #[test]
    fn three_subfeeds_clamped_to_pdu_ceiling() {
        let t = tiers();
        let mut topo = topology().with_selected(&["A01"]).unwrap();
        topo.set_subfeeds("A01", 0, &[0, 1, 2]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Pdu, SubfeedPolicy::ClampToPdu);
        assert_eq!(slots[0].capacity_kw, t.pdu_kw);
    }

    #[test]
    fn subfeed_granularity_splits_metered_pdus() {
        let t = tiers();
        let mut topo = topology().with_selected(&["A01"]).unwrap();
        topo.set_subfeeds("A01", 0, &[5, 2]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Subfeed, SubfeedPolicy::Unclamped);
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["A01-1-S3", "A01-1-S6", "A01-2"]);
        assert_eq!(slots[0].capacity_kw, t.subfeed_kw);
        assert_eq!(slots[2].capacity_kw, t.pdu_kw);
    }

    #[test]
    fn subfeed_granularity_clamp_shares_pdu_ceiling() {
        let t = tiers();
        let mut topo = topology().with_selected(&["A01"]).unwrap();
        topo.set_subfeeds("A01", 0, &[0, 1, 2]).unwrap();
        let slots = resolve(&topo, &t, Granularity::Subfeed, SubfeedPolicy::ClampToPdu);
        let pdu_total: f64 = slots.iter().take(3).map(|s| s.capacity_kw).sum();
        assert!(pdu_total <= t.pdu_kw + 1e-9);
    }

    #[test]
    fn resolution_is_reproducible() {
        let mut topo = topology().with_selected(&["A01", "A02", "B01"]).unwrap();
        topo.set_subfeeds("A02", 1, &[1, 4]).unwrap();
        let a = resolve(&topo, &tiers(), Granularity::Subfeed, SubfeedPolicy::default());
        let b = resolve(&topo, &tiers(), Granularity::Subfeed, SubfeedPolicy::default());
        assert_eq!(a, b);
    }
}

//! Planner that wires capacity, resolution, and allocation into one call.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::capacity::TierCapacities;
use crate::config::PlannerConfig;

use super::allocator::allocate;
use super::resolver::resolve;
use super::status::{SlotStatus, TargetStatus, round_kw};
use super::topology::Topology;
use super::types::{Granularity, Slot, SubfeedPolicy};

/// Errors raised when editing a computed plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("slot index {index} is out of range (plan has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },
    #[error("load for slot {index} must be a finite number, got {value}")]
    NonFiniteLoad { index: usize, value: f64 },
}

/// Stateless planner holding the derived ceilings and resolution options.
///
/// # Examples
///
/// ```
/// use lineup_planner::config::PlannerConfig;
/// use lineup_planner::plan::engine::Planner;
/// use lineup_planner::plan::topology::Topology;
///
/// let planner = Planner::from_config(&PlannerConfig::baseline());
/// let topo = Topology::from_catalog(&["A01", "B01"], 2)
///     .with_selected(&["A01", "B01"])
///     .unwrap();
/// let plan = planner.plan(&topo, 1.0);
/// assert_eq!(plan.slots().len(), 4);
/// assert!((plan.total_assigned_kw() - 1000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planner {
    tiers: TierCapacities,
    granularity: Granularity,
    policy: SubfeedPolicy,
}

impl Planner {
    /// Creates a planner from explicit ceilings and options.
    pub fn new(tiers: TierCapacities, granularity: Granularity, policy: SubfeedPolicy) -> Self {
        Self {
            tiers,
            granularity,
            policy,
        }
    }

    /// Creates a planner from the ratings and options of a configuration.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(
            config.tier_capacities(),
            config.plan.granularity,
            config.plan.subfeed_policy,
        )
    }

    /// Returns a copy using the given slot granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Derived tier ceilings.
    pub fn tiers(&self) -> &TierCapacities {
        &self.tiers
    }

    /// Resolves the topology and allocates `target_mw` across it.
    ///
    /// # Arguments
    ///
    /// * `topology` - Catalog and selection snapshot
    /// * `target_mw` - Target load in megawatts
    ///
    /// # Returns
    ///
    /// A fresh [`LoadPlan`]. Plans are never patched after a topology edit;
    /// call this again instead.
    pub fn plan(&self, topology: &Topology, target_mw: f64) -> LoadPlan {
        let target_kw = target_mw * 1000.0;
        let slots = resolve(topology, &self.tiers, self.granularity, self.policy);
        let allocation = allocate(&slots, target_kw, self.tiers.lineup_kw);

        let total: f64 = allocation.total_kw();
        info!(
            slots = slots.len(),
            target_kw,
            assigned_kw = round_kw(total),
            "plan computed"
        );
        if total < target_kw && round_kw(target_kw - total) > 0.0 {
            warn!(
                shortfall_kw = round_kw(target_kw - total),
                "selected topology cannot carry the target load"
            );
        }

        LoadPlan {
            slots,
            distribution: allocation.distribution,
            saturated: allocation.saturated,
            target_kw,
            lineup_capacity_kw: self.tiers.lineup_kw,
        }
    }
}

/// A slot list paired with the load assigned to each slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    slots: Vec<Slot>,
    distribution: Vec<f64>,
    saturated: BTreeSet<String>,
    target_kw: f64,
    lineup_capacity_kw: f64,
}

/// One presentation row of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRow<'a> {
    /// Position in the slot list.
    pub index: usize,
    pub slot: &'a Slot,
    /// Assigned load (kW).
    pub load_kw: f64,
    pub status: SlotStatus,
    /// Whether the owning lineup is saturated.
    pub lineup_saturated: bool,
}

impl fmt::Display for PlanRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} {:<10} | load={:>8.2} kW  cap={:>8.2} kW | {}{}",
            self.index,
            self.slot.label(),
            self.load_kw,
            self.slot.capacity_kw,
            self.status,
            if self.lineup_saturated {
                " (lineup saturated)"
            } else {
                ""
            },
        )
    }
}

impl LoadPlan {
    /// Ordered slot list the distribution is positioned against.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Assigned load per slot (kW).
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Lineups at their aggregate ceiling after automatic allocation.
    pub fn saturated(&self) -> &BTreeSet<String> {
        &self.saturated
    }

    /// Target load (kW).
    pub fn target_kw(&self) -> f64 {
        self.target_kw
    }

    /// Lineup ceiling used for allocation (kW).
    pub fn lineup_capacity_kw(&self) -> f64 {
        self.lineup_capacity_kw
    }

    /// Sum of the distribution (kW).
    pub fn total_assigned_kw(&self) -> f64 {
        self.distribution.iter().sum()
    }

    /// Sum of the distribution for one lineup (kW).
    pub fn lineup_total_kw(&self, lineup_id: &str) -> f64 {
        self.rows()
            .filter(|r| r.slot.lineup_id == lineup_id)
            .map(|r| r.load_kw)
            .sum()
    }

    /// Unplaced load (kW, >= 0).
    pub fn shortfall_kw(&self) -> f64 {
        (self.target_kw - self.total_assigned_kw()).max(0.0)
    }

    /// Target comparison for the totals view.
    pub fn target_status(&self) -> TargetStatus {
        TargetStatus::of(self.total_assigned_kw(), self.target_kw)
    }

    /// Health of one slot, or `None` if `index` is out of range.
    pub fn slot_status(&self, index: usize) -> Option<SlotStatus> {
        let slot = self.slots.get(index)?;
        let load = self.distribution.get(index)?;
        Some(SlotStatus::of(*load, slot.capacity_kw))
    }

    /// Rows in slot order.
    pub fn rows(&self) -> impl Iterator<Item = PlanRow<'_>> + '_ {
        self.slots
            .iter()
            .zip(&self.distribution)
            .enumerate()
            .map(|(index, (slot, &load_kw))| PlanRow {
                index,
                slot,
                load_kw,
                status: SlotStatus::of(load_kw, slot.capacity_kw),
                lineup_saturated: self.saturated.contains(&slot.lineup_id),
            })
    }

    /// Overrides the load of one slot, as a user editing the plan would.
    ///
    /// The value is rounded to 2 dp and negative values clamp to zero. It may
    /// exceed the slot ceiling; that shows up as [`SlotStatus::Overloaded`].
    /// The saturation set is left as computed by the allocator.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] for an out-of-range index or a non-finite value.
    pub fn set_load(&mut self, index: usize, load_kw: f64) -> Result<(), PlanError> {
        let len = self.distribution.len();
        if !load_kw.is_finite() {
            return Err(PlanError::NonFiniteLoad {
                index,
                value: load_kw,
            });
        }
        let entry = self
            .distribution
            .get_mut(index)
            .ok_or(PlanError::SlotOutOfRange { index, len })?;
        *entry = round_kw(load_kw).max(0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::RatingSet;

    fn planner() -> Planner {
        Planner::new(
            TierCapacities::from_ratings(
                &RatingSet::new(415.0, 800.0, 1.0, 1.0),
                &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
                &RatingSet::new(480.0, 1000.0, 1.0, 0.8),
            ),
            Granularity::Pdu,
            SubfeedPolicy::ClampToPdu,
        )
    }

    fn topology() -> Topology {
        Topology::from_catalog(&["A01", "A02", "B01"], 2)
            .with_selected(&["A01", "B01"])
            .unwrap()
    }

    #[test]
    fn megawatts_convert_to_kilowatts() {
        let plan = planner().plan(&topology(), 0.5);
        assert_eq!(plan.target_kw(), 500.0);
        assert_eq!(plan.total_assigned_kw(), 500.0);
        assert_eq!(plan.target_status(), TargetStatus::Within);
    }

    #[test]
    fn distribution_matches_slot_count() {
        let plan = planner().plan(&topology(), 5.0);
        assert_eq!(plan.distribution().len(), plan.slots().len());
        assert!(plan.shortfall_kw() > 0.0);
        assert_eq!(plan.saturated().len(), 2);
    }

    #[test]
    fn manual_edit_can_overload_a_slot() {
        let mut plan = planner().plan(&topology(), 1.0);
        plan.set_load(0, 900.456).unwrap();
        assert_eq!(plan.distribution()[0], 900.46);
        assert_eq!(plan.slot_status(0), Some(SlotStatus::Overloaded));
        assert_eq!(plan.target_status(), TargetStatus::Exceeds);
    }

    #[test]
    fn manual_edit_clamps_negative_to_zero() {
        let mut plan = planner().plan(&topology(), 1.0);
        plan.set_load(3, -12.0).unwrap();
        assert_eq!(plan.distribution()[3], 0.0);
    }

    #[test]
    fn manual_edit_rejects_bad_input() {
        let mut plan = planner().plan(&topology(), 1.0);
        assert_eq!(
            plan.set_load(4, 1.0),
            Err(PlanError::SlotOutOfRange { index: 4, len: 4 })
        );
        assert!(matches!(
            plan.set_load(0, f64::NAN),
            Err(PlanError::NonFiniteLoad { index: 0, .. })
        ));
    }

    #[test]
    fn rows_carry_labels_and_saturation() {
        let plan = planner().plan(&topology(), 5.0);
        let labels: Vec<String> = plan.rows().map(|r| r.slot.label()).collect();
        assert_eq!(labels, vec!["A01-1", "A01-2", "B01-1", "B01-2"]);
        assert!(plan.rows().all(|r| r.lineup_saturated));
        assert!(plan.rows().all(|r| r.status == SlotStatus::Ok));
    }

    #[test]
    fn row_display_does_not_panic() {
        let plan = planner().plan(&topology(), 5.0);
        let line = plan.rows().next().map(|r| r.to_string()).unwrap_or_default();
        assert!(line.contains("A01-1"));
        assert!(line.contains("lineup saturated"));
    }

    #[test]
    fn lineup_totals_respect_ceiling() {
        let plan = planner().plan(&topology(), 5.0);
        for id in ["A01", "B01"] {
            assert!(plan.lineup_total_kw(id) <= plan.lineup_capacity_kw() + 1e-9);
        }
        assert_eq!(plan.lineup_total_kw("A02"), 0.0);
    }

    #[test]
    fn subfeed_granularity_plan() {
        let mut topo = topology();
        topo.set_subfeeds("A01", 0, &[0, 1]).unwrap();
        let plan = planner()
            .with_granularity(Granularity::Subfeed)
            .plan(&topo, 0.1);
        assert_eq!(plan.slots().len(), 5);
        assert_eq!(plan.distribution(), &[20.0, 20.0, 20.0, 20.0, 20.0]);
    }
}

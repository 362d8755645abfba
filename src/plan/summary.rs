//! Totals view computed from a finished plan.

use std::fmt;

use super::engine::LoadPlan;
use super::status::{SlotStatus, TargetStatus};
use super::topology::Topology;

/// Aggregate figures for one plan.
///
/// Derived post-hoc from a [`LoadPlan`] and the topology it was resolved
/// from, so every number agrees with the engine's own capacities.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    /// Selected lineups.
    pub lineups_in_use: usize,
    /// PDUs in use across selected lineups.
    pub pdus_in_use: usize,
    /// Target divided evenly over the PDUs in use (kW).
    pub even_load_per_pdu_kw: f64,
    /// PDU main-breaker ceiling (kW).
    pub pdu_capacity_kw: f64,
    /// Lineup ceiling (kW).
    pub lineup_capacity_kw: f64,
    /// Selected lineups times the lineup ceiling (MW).
    pub available_capacity_mw: f64,
    /// Target load (kW).
    pub target_kw: f64,
    /// Sum of the distribution (kW).
    pub assigned_kw: f64,
    /// Target minus assigned, floored at zero (kW).
    pub shortfall_kw: f64,
    /// Target comparison.
    pub target_status: TargetStatus,
    /// Slots whose load is above their ceiling.
    pub overloaded_slots: usize,
    /// Saturated lineup ids, in catalog order.
    pub saturated_lineups: Vec<String>,
}

impl PlanSummary {
    /// Computes the summary.
    ///
    /// # Arguments
    ///
    /// * `plan` - Finished (possibly hand-edited) plan
    /// * `topology` - Topology the plan was resolved from
    /// * `pdu_capacity_kw` - PDU main-breaker ceiling
    pub fn from_plan(plan: &LoadPlan, topology: &Topology, pdu_capacity_kw: f64) -> Self {
        let lineups_in_use = topology.selected_lineups().count();
        let pdus_in_use = topology.active_pdu_count();
        let even_load_per_pdu_kw = if pdus_in_use > 0 {
            plan.target_kw() / pdus_in_use as f64
        } else {
            0.0
        };

        Self {
            lineups_in_use,
            pdus_in_use,
            even_load_per_pdu_kw,
            pdu_capacity_kw,
            lineup_capacity_kw: plan.lineup_capacity_kw(),
            available_capacity_mw: lineups_in_use as f64 * plan.lineup_capacity_kw() / 1000.0,
            target_kw: plan.target_kw(),
            assigned_kw: plan.total_assigned_kw(),
            shortfall_kw: plan.shortfall_kw(),
            target_status: plan.target_status(),
            overloaded_slots: plan
                .rows()
                .filter(|r| r.status == SlotStatus::Overloaded)
                .count(),
            saturated_lineups: topology
                .lineups()
                .iter()
                .filter(|l| plan.saturated().contains(&l.id))
                .map(|l| l.id.clone())
                .collect(),
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Plan Summary ---")?;
        writeln!(f, "Lineups in use:        {}", self.lineups_in_use)?;
        writeln!(f, "PDUs in use:           {}", self.pdus_in_use)?;
        writeln!(f, "Even load per PDU:     {:.2} kW", self.even_load_per_pdu_kw)?;
        writeln!(f, "Max capacity per PDU:  {:.2} kW", self.pdu_capacity_kw)?;
        writeln!(f, "Lineup ceiling:        {:.2} kW", self.lineup_capacity_kw)?;
        writeln!(f, "Available capacity:    {:.2} MW", self.available_capacity_mw)?;
        writeln!(f, "Target load:           {:.2} kW", self.target_kw)?;
        writeln!(f, "Assigned load:         {:.2} kW", self.assigned_kw)?;
        writeln!(f, "Shortfall:             {:.2} kW", self.shortfall_kw)?;
        writeln!(f, "Overloaded slots:      {}", self.overloaded_slots)?;
        let saturated = if self.saturated_lineups.is_empty() {
            "none".to_string()
        } else {
            self.saturated_lineups.join(", ")
        };
        writeln!(f, "Saturated lineups:     {saturated}")?;
        write!(f, "Status:                {}", self.target_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::plan::engine::Planner;

    fn setup(target_mw: f64) -> (LoadPlan, Topology, f64) {
        let planner = Planner::from_config(&PlannerConfig::baseline());
        let topo = Topology::from_catalog(&["A01", "A02", "B01"], 2)
            .with_selected(&["A01", "A02", "B01"])
            .unwrap();
        let plan = planner.plan(&topo, target_mw);
        (plan, topo, planner.tiers().pdu_kw)
    }

    #[test]
    fn even_load_and_available_capacity() {
        let (plan, topo, pdu_kw) = setup(1.2);
        let summary = PlanSummary::from_plan(&plan, &topo, pdu_kw);
        assert_eq!(summary.pdus_in_use, 6);
        assert!((summary.even_load_per_pdu_kw - 200.0).abs() < 1e-9);
        let expected_mw = 3.0 * plan.lineup_capacity_kw() / 1000.0;
        assert!((summary.available_capacity_mw - expected_mw).abs() < 1e-12);
        assert_eq!(summary.shortfall_kw, 0.0);
        assert!(summary.saturated_lineups.is_empty());
    }

    #[test]
    fn shortfall_and_saturation_reported() {
        let (plan, topo, pdu_kw) = setup(10.0);
        let summary = PlanSummary::from_plan(&plan, &topo, pdu_kw);
        assert!(summary.shortfall_kw > 0.0);
        assert_eq!(summary.saturated_lineups, vec!["A01", "A02", "B01"]);
        assert_eq!(summary.target_status, TargetStatus::Within);
    }

    #[test]
    fn saturated_lineups_follow_catalog_order() {
        let planner = Planner::from_config(&PlannerConfig::baseline());
        let topo = Topology::from_catalog(&["L3", "L1"], 2)
            .with_selected(&["L3", "L1"])
            .unwrap();
        let plan = planner.plan(&topo, 10.0);
        let summary = PlanSummary::from_plan(&plan, &topo, planner.tiers().pdu_kw);
        assert_eq!(summary.saturated_lineups, vec!["L3", "L1"]);
    }

    #[test]
    fn empty_selection_has_zero_even_load() {
        let planner = Planner::from_config(&PlannerConfig::baseline());
        let topo = Topology::from_catalog(&["A01"], 2);
        let plan = planner.plan(&topo, 1.0);
        let summary = PlanSummary::from_plan(&plan, &topo, planner.tiers().pdu_kw);
        assert_eq!(summary.even_load_per_pdu_kw, 0.0);
        assert_eq!(summary.assigned_kw, 0.0);
    }

    #[test]
    fn display_contains_key_lines() {
        let (plan, topo, pdu_kw) = setup(1.0);
        let s = PlanSummary::from_plan(&plan, &topo, pdu_kw).to_string();
        assert!(s.contains("Assigned load:         1000.00 kW"));
        assert!(s.contains("Saturated lineups:     none"));
        assert!(s.contains("Within Target Load"));
    }
}

//! TOML-based planner configuration and preset definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::capacity::{RatingSet, TierCapacities};
use crate::plan::topology::{DEFAULT_PDUS_PER_LINEUP, Topology, TopologyError};
use crate::plan::types::{Granularity, SubfeedPolicy};

/// Lineup identifiers offered by the default catalog, in display order.
pub const DEFAULT_CATALOG: &[&str] = &[
    "A01", "A02", "B01", "B02", "C01", "C02", "D01", "D02", "E01", "E02",
];

/// Lineups selected when no selection is configured.
pub const DEFAULT_SELECTION: &[&str] = &["A01", "A02", "B01", "B02", "C01"];

/// Top-level planner configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML with
/// [`PlannerConfig::from_toml_file`] or use [`PlannerConfig::baseline`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Electrical ratings per tier.
    #[serde(default)]
    pub ratings: RatingsConfig,
    /// Lineup catalog and selection.
    #[serde(default)]
    pub topology: TopologyConfig,
    /// Target load and resolution options.
    #[serde(default)]
    pub plan: PlanConfig,
}

/// Ratings for the three tiers.
///
/// An omitted tier table keeps this tier's default. A tier table that is
/// present must be complete.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatingsConfig {
    pub subfeed: RatingSet,
    pub pdu: RatingSet,
    pub lineup: RatingSet,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            subfeed: RatingSet::new(415.0, 800.0, 1.0, 1.0),
            pdu: RatingSet::new(480.0, 1000.0, 1.0, 0.8),
            lineup: RatingSet::new(480.0, 1000.0, 1.0, 0.8),
        }
    }
}

/// Catalog and selection state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopologyConfig {
    /// Lineup ids in display order.
    pub catalog: Vec<String>,
    /// PDUs fitted to every lineup (must be > 0).
    pub pdus_per_lineup: usize,
    /// Selected lineup ids.
    pub selected: Vec<String>,
    /// Explicit PDU selections by lineup id (zero-based indices). Lineups
    /// without an entry use all of their PDUs.
    pub pdu_selection: BTreeMap<String, Vec<usize>>,
    /// Active subfeed breakers.
    pub subfeeds: Vec<SubfeedConfig>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            pdus_per_lineup: DEFAULT_PDUS_PER_LINEUP,
            selected: DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect(),
            pdu_selection: BTreeMap::new(),
            subfeeds: Vec::new(),
        }
    }
}

/// Active subfeeds of one PDU.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubfeedConfig {
    pub lineup: String,
    /// Zero-based PDU index.
    pub pdu: usize,
    /// Zero-based subfeed indices (0-7).
    pub active: Vec<usize>,
}

/// Target load and resolution options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    /// Target load (MW, must be finite and >= 0).
    pub target_mw: f64,
    /// `"pdu"` or `"subfeed"`.
    pub granularity: Granularity,
    /// `"clamp_to_pdu"` or `"unclamped"`.
    pub subfeed_policy: SubfeedPolicy,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            target_mw: 5.0,
            granularity: Granularity::Pdu,
            subfeed_policy: SubfeedPolicy::ClampToPdu,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"ratings.pdu.voltage_v"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl PlannerConfig {
    /// Returns the baseline configuration: ten lineups, five selected, 5 MW.
    pub fn baseline() -> Self {
        Self {
            ratings: RatingsConfig::default(),
            topology: TopologyConfig::default(),
            plan: PlanConfig::default(),
        }
    }

    /// Returns a single-lineup configuration sized below one lineup ceiling.
    pub fn single_lineup() -> Self {
        Self {
            topology: TopologyConfig {
                selected: vec!["A01".to_string()],
                ..TopologyConfig::default()
            },
            plan: PlanConfig {
                target_mw: 0.5,
                ..PlanConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns a metered configuration planned per subfeed breaker.
    pub fn metered() -> Self {
        Self {
            topology: TopologyConfig {
                selected: vec!["A01".to_string(), "B01".to_string()],
                subfeeds: vec![
                    SubfeedConfig {
                        lineup: "A01".to_string(),
                        pdu: 0,
                        active: vec![0, 1, 2],
                    },
                    SubfeedConfig {
                        lineup: "B01".to_string(),
                        pdu: 1,
                        active: vec![0],
                    },
                ],
                ..TopologyConfig::default()
            },
            plan: PlanConfig {
                target_mw: 1.0,
                granularity: Granularity::Subfeed,
                ..PlanConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "single_lineup", "metered"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "single_lineup" => Ok(Self::single_lineup()),
            "metered" => Ok(Self::metered()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Derived ceilings for the configured ratings.
    pub fn tier_capacities(&self) -> TierCapacities {
        TierCapacities::from_ratings(
            &self.ratings.subfeed,
            &self.ratings.pdu,
            &self.ratings.lineup,
        )
    }

    /// Builds the topology described by the `[topology]` section.
    ///
    /// # Errors
    ///
    /// Returns the first [`TopologyError`] hit by a selection entry.
    pub fn build_topology(&self) -> Result<Topology, TopologyError> {
        let t = &self.topology;
        let mut topology =
            Topology::from_catalog(&t.catalog, t.pdus_per_lineup).with_selected(&t.selected)?;
        for (id, pdus) in &t.pdu_selection {
            topology.set_pdu_selection(id, Some(pdus.as_slice()))?;
        }
        for entry in &t.subfeeds {
            topology.set_subfeeds(&entry.lineup, entry.pdu, &entry.active)?;
        }
        Ok(topology)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (tier, rating) in [
            ("subfeed", &self.ratings.subfeed),
            ("pdu", &self.ratings.pdu),
            ("lineup", &self.ratings.lineup),
        ] {
            validate_rating(tier, rating, &mut errors);
        }

        let t = &self.topology;
        if t.catalog.is_empty() {
            errors.push(ConfigError::new("topology.catalog", "must not be empty"));
        }
        for (i, id) in t.catalog.iter().enumerate() {
            if t.catalog[..i].contains(id) {
                errors.push(ConfigError::new(
                    "topology.catalog",
                    format!("duplicate lineup id \"{id}\""),
                ));
            }
        }
        if t.pdus_per_lineup == 0 {
            errors.push(ConfigError::new("topology.pdus_per_lineup", "must be > 0"));
        }
        if let Err(e) = self.build_topology() {
            errors.push(ConfigError::new("topology", e.to_string()));
        }

        let p = &self.plan;
        if !p.target_mw.is_finite() || p.target_mw < 0.0 {
            errors.push(ConfigError::new(
                "plan.target_mw",
                "must be a finite number >= 0",
            ));
        }

        errors
    }
}

fn validate_rating(tier: &str, rating: &RatingSet, errors: &mut Vec<ConfigError>) {
    let field = |name: &str| format!("ratings.{tier}.{name}");
    if !(rating.voltage_v.is_finite() && rating.voltage_v > 0.0) {
        errors.push(ConfigError::new(field("voltage_v"), "must be > 0"));
    }
    if !(rating.breaker_amps.is_finite() && rating.breaker_amps > 0.0) {
        errors.push(ConfigError::new(field("breaker_amps"), "must be > 0"));
    }
    if !(rating.power_factor > 0.0 && rating.power_factor <= 1.0) {
        errors.push(ConfigError::new(field("power_factor"), "must be in (0.0, 1.0]"));
    }
    if !(rating.derating_factor > 0.0 && rating.derating_factor <= 1.0) {
        errors.push(ConfigError::new(
            field("derating_factor"),
            "must be in (0.0, 1.0]",
        ));
    }
}

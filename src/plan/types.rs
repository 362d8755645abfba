//! Core planning types: slots, resolution options, and allocation output.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

/// How finely the resolver splits the topology into allocatable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One slot per active PDU.
    #[default]
    Pdu,
    /// One slot per active subfeed breaker.
    Subfeed,
}

impl Granularity {
    /// Parses a CLI/config name (`"pdu"` or `"subfeed"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pdu" => Some(Self::Pdu),
            "subfeed" => Some(Self::Subfeed),
            _ => None,
        }
    }
}

/// Whether subfeed-derived capacity may exceed the PDU main breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubfeedPolicy {
    /// Cap at `min(active * subfeed_kw, pdu_kw)`.
    #[default]
    ClampToPdu,
    /// Use `active * subfeed_kw` as-is.
    Unclamped,
}

impl SubfeedPolicy {
    /// Parses a CLI/config name (`"clamp_to_pdu"` or `"unclamped"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clamp_to_pdu" => Some(Self::ClampToPdu),
            "unclamped" => Some(Self::Unclamped),
            _ => None,
        }
    }
}

/// One allocatable unit of the flattened topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Owning lineup identifier.
    pub lineup_id: String,
    /// Zero-based PDU index within the lineup.
    pub pdu_index: usize,
    /// Zero-based subfeed index, for subfeed-granularity slots.
    pub subfeed_index: Option<usize>,
    /// Number of active subfeeds on the owning PDU (0 = unmetered).
    pub active_subfeeds: usize,
    /// Load ceiling (kW). Non-positive means the slot accepts nothing.
    pub capacity_kw: f64,
}

impl Slot {
    /// Display label: `"A01-1"` for a PDU, `"A01-1-S3"` for a subfeed.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lineup_id, self.pdu_index + 1)?;
        if let Some(s) = self.subfeed_index {
            write!(f, "-S{}", s + 1)?;
        }
        Ok(())
    }
}

/// Output of one allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Assigned load per slot (kW), positionally matching the slot list.
    pub distribution: Vec<f64>,
    /// Lineups whose assigned total reached the lineup ceiling.
    pub saturated: BTreeSet<String>,
}

impl Allocation {
    /// Sum of all assigned load (kW).
    pub fn total_kw(&self) -> f64 {
        self.distribution.iter().sum()
    }
}

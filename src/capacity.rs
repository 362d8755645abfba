//! Three-phase capacity model for subfeed breakers, PDUs, and lineups.

use serde::Deserialize;

/// `sqrt(3)`, the line-to-line factor of balanced three-phase power.
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Electrical ratings of one distribution tier.
///
/// A TOML tier table must set every key. No single default fits all tiers.
///
/// # Examples
///
/// ```
/// use lineup_planner::capacity::RatingSet;
///
/// let pdu = RatingSet::new(480.0, 1000.0, 1.0, 0.8);
/// assert!((pdu.capacity_kw() - 665.1).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingSet {
    /// Phase-to-phase voltage (V).
    pub voltage_v: f64,
    /// Breaker rating (A).
    pub breaker_amps: f64,
    /// Power factor (0.0-1.0).
    pub power_factor: f64,
    /// Usable fraction of the breaker rating (1.0 = no derating).
    pub derating_factor: f64,
}

impl RatingSet {
    /// Creates a rating set.
    pub fn new(voltage_v: f64, breaker_amps: f64, power_factor: f64, derating_factor: f64) -> Self {
        Self {
            voltage_v,
            breaker_amps,
            power_factor,
            derating_factor,
        }
    }

    /// Returns the kilowatt ceiling for these ratings.
    ///
    /// Non-positive ratings yield a non-positive ceiling, which the allocator
    /// treats as a slot that accepts no load.
    pub fn capacity_kw(&self) -> f64 {
        capacity_kw(self)
    }
}

/// Three-phase power ceiling: `sqrt(3) * V * A * pf * derate / 1000`.
///
/// # Arguments
///
/// * `rating` - Tier ratings
///
/// # Returns
///
/// Ceiling in kW.
pub fn capacity_kw(rating: &RatingSet) -> f64 {
    SQRT_3 * rating.voltage_v * rating.breaker_amps * rating.power_factor * rating.derating_factor
        / 1000.0
}

/// Derived ceilings for every tier of the distribution topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCapacities {
    /// Ceiling of a single subfeed breaker (kW).
    pub subfeed_kw: f64,
    /// Ceiling of a PDU main breaker (kW).
    pub pdu_kw: f64,
    /// Aggregate ceiling of one lineup (kW), independent of active PDU count.
    pub lineup_kw: f64,
}

impl TierCapacities {
    /// Derives all tier ceilings from their rating sets.
    pub fn from_ratings(subfeed: &RatingSet, pdu: &RatingSet, lineup: &RatingSet) -> Self {
        Self {
            subfeed_kw: subfeed.capacity_kw(),
            pdu_kw: pdu.capacity_kw(),
            lineup_kw: lineup.capacity_kw(),
        }
    }
}

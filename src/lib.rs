//! Capacity-aware load allocation across data-center lineups, PDUs, and
//! subfeed breakers.

pub mod capacity;
pub mod cli;
pub mod config;
/// File exports of computed plans.
pub mod io {
    pub mod export;
}
/// Topology resolution, allocation, and plan views.
pub mod plan;

#[cfg(feature = "api")]
pub mod api;

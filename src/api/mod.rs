//! REST API serving a computed load plan.
//!
//! Provides two GET endpoints:
//! - `/plan`: summary figures and every slot row
//! - `/slots`: slot rows, optionally filtered by lineup

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::plan::engine::LoadPlan;
use crate::plan::summary::PlanSummary;
use crate::plan::topology::Topology;

pub use types::{ErrorResponse, PlanResponse, SlotRecord, SlotsQuery, SummaryRecord};

/// Immutable application state shared across all request handlers.
///
/// Built once after planning and wrapped in `Arc`; handlers only read it.
pub struct AppState {
    /// Topology the plan was resolved from.
    pub topology: Topology,
    /// The computed (possibly hand-edited) plan.
    pub plan: LoadPlan,
    /// Totals view of `plan`.
    pub summary: PlanSummary,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/plan", get(handlers::get_plan))
        .route("/slots", get(handlers::get_slots))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}

//! Lineup planner entry point: CLI wiring and config-driven planning.

use std::io;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use lineup_planner::cli::{self, CliCommand, CliOptions};
use lineup_planner::io::export::export_csv;
use lineup_planner::plan::engine::Planner;
use lineup_planner::plan::summary::PlanSummary;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn main() {
    init_tracing();

    let opts: CliOptions = match cli::parse_args() {
        Ok(CliCommand::Run(opts)) => opts,
        Ok(CliCommand::Help) => {
            cli::print_usage();
            return;
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    // Load config: --config takes priority, then --preset, then baseline
    let mut config = opts.load_config().unwrap_or_else(|e| fail(e));
    opts.apply_overrides(&mut config);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let topology = config.build_topology().unwrap_or_else(|e| fail(e));
    let planner = Planner::from_config(&config);
    debug!(tiers = ?planner.tiers(), "derived tier capacities");

    let mut plan = planner.plan(&topology, config.plan.target_mw);
    for &(index, kw) in &opts.edits {
        if let Err(e) = plan.set_load(index, kw) {
            fail(e);
        }
    }

    for row in plan.rows() {
        println!("{row}");
    }

    let summary = PlanSummary::from_plan(&plan, &topology, planner.tiers().pdu_kw);
    println!("\n{summary}");

    if let Some(ref path) = opts.csv_out {
        if let Err(e) = export_csv(&plan, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Plan written to {}", path.display());
    }

    if opts.serve {
        serve(topology, plan, summary, opts.port);
    }
}

#[cfg(feature = "api")]
fn serve(
    topology: lineup_planner::plan::topology::Topology,
    plan: lineup_planner::plan::engine::LoadPlan,
    summary: PlanSummary,
    port: u16,
) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use lineup_planner::api::{self, AppState};

    let state = Arc::new(AppState {
        topology,
        plan,
        summary,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
    if let Err(e) = rt.block_on(api::serve(state, addr)) {
        fail(format!("API server on {addr}: {e}"));
    }
}

#[cfg(not(feature = "api"))]
fn serve(
    _topology: lineup_planner::plan::topology::Topology,
    _plan: lineup_planner::plan::engine::LoadPlan,
    _summary: PlanSummary,
    _port: u16,
) {
    tracing::warn!("--serve ignored: built without the `api` feature");
}

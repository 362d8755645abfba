//! CSV export for computed load plans.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::plan::engine::LoadPlan;

/// Column header for plan export.
const HEADER: &str = "slot,lineup,pdu,subfeed,capacity_kw,load_kw,status";

/// Exports a plan to a CSV file at the given path.
///
/// Writes a header row followed by one row per slot, in slot order. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(plan: &LoadPlan, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(plan, buf)
}

/// Writes a plan as CSV to any writer.
///
/// PDU and subfeed numbers are one-based to match slot labels; `subfeed` is
/// empty for PDU-level slots. Loads and capacities use two decimals.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(plan: &LoadPlan, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for row in plan.rows() {
        let slot = row.slot;
        wtr.write_record(&[
            slot.label(),
            slot.lineup_id.clone(),
            (slot.pdu_index + 1).to_string(),
            slot.subfeed_index
                .map(|s| (s + 1).to_string())
                .unwrap_or_default(),
            format!("{:.2}", slot.capacity_kw),
            format!("{:.2}", row.load_kw),
            row.status.as_str().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

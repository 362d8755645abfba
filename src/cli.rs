//! Command-line option parsing for the `lineup-planner` binary.

use std::env;
use std::path::PathBuf;

use crate::config::PlannerConfig;
use crate::plan::types::{Granularity, SubfeedPolicy};

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Compute and print a plan.
    Run(CliOptions),
    /// Print usage and exit.
    Help,
}

/// Options for a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub target_mw: Option<f64>,
    /// Replaces the configured lineup selection.
    pub lineups: Option<Vec<String>>,
    pub granularity: Option<Granularity>,
    pub subfeed_policy: Option<SubfeedPolicy>,
    /// Manual `(slot index, kW)` overrides applied after allocation.
    pub edits: Vec<(usize, f64)>,
    pub csv_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            preset: None,
            target_mw: None,
            lineups: None,
            granularity: None,
            subfeed_policy: None,
            edits: Vec::new(),
            csv_out: None,
            serve: false,
            port: DEFAULT_PORT,
        }
    }
}

impl CliOptions {
    /// Loads the base configuration: `--config`, then `--preset`, then baseline.
    ///
    /// # Errors
    ///
    /// Returns the loader's error message.
    pub fn load_config(&self) -> Result<PlannerConfig, String> {
        let config = if let Some(path) = &self.config {
            PlannerConfig::from_toml_file(path)
        } else if let Some(name) = &self.preset {
            PlannerConfig::from_preset(name)
        } else {
            Ok(PlannerConfig::baseline())
        };
        config.map_err(|e| e.to_string())
    }

    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut PlannerConfig) {
        if let Some(target) = self.target_mw {
            config.plan.target_mw = target;
        }
        if let Some(lineups) = &self.lineups {
            config.topology.selected = lineups.clone();
        }
        if let Some(granularity) = self.granularity {
            config.plan.granularity = granularity;
        }
        if let Some(policy) = self.subfeed_policy {
            config.plan.subfeed_policy = policy;
        }
    }
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliCommand, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parses an argument list (without the program name).
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args_from(args: &[String]) -> Result<CliCommand, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--target-mw" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --target-mw (expected megawatts)",
                )?;
                let value: f64 = raw
                    .parse()
                    .map_err(|_| format!("--target-mw value \"{raw}\" is not a number"))?;
                opts.target_mw = Some(value);
            }
            "--lineups" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --lineups (expected e.g. A01,B01)",
                )?;
                opts.lineups = Some(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            "--granularity" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --granularity (pdu or subfeed)")?;
                opts.granularity = Some(Granularity::from_name(raw).ok_or_else(|| {
                    format!("--granularity must be \"pdu\" or \"subfeed\", got \"{raw}\"")
                })?);
            }
            "--subfeed-policy" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --subfeed-policy (clamp_to_pdu or unclamped)",
                )?;
                opts.subfeed_policy = Some(SubfeedPolicy::from_name(raw).ok_or_else(|| {
                    format!(
                        "--subfeed-policy must be \"clamp_to_pdu\" or \"unclamped\", got \"{raw}\""
                    )
                })?);
            }
            "--set" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --set (expected <slot>=<kW>)")?;
                opts.edits.push(parse_edit(raw)?);
            }
            "--csv-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --csv-out (expected a file path)",
                )?;
                if opts.csv_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--csv-out provided more than once".to_string());
                }
            }
            "--serve" => opts.serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(CliCommand::Run(opts))
}

fn parse_edit(raw: &str) -> Result<(usize, f64), String> {
    let (slot, kw) = raw
        .split_once('=')
        .ok_or_else(|| format!("--set value \"{raw}\" must look like <slot>=<kW>"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .map_err(|_| format!("--set slot \"{slot}\" is not a valid index"))?;
    let kw: f64 = kw
        .trim()
        .parse()
        .map_err(|_| format!("--set load \"{kw}\" is not a number"))?;
    Ok((slot, kw))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

/// Prints usage to stderr.
pub fn print_usage() {
    eprintln!("lineup-planner: capacity-aware load allocation across lineups and PDUs");
    eprintln!();
    eprintln!("Usage: lineup-planner [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>            Load configuration from a TOML file");
    eprintln!(
        "  --preset <name>            Use a built-in preset ({})",
        PlannerConfig::PRESETS.join(", ")
    );
    eprintln!("  --target-mw <f64>          Override the target load (MW)");
    eprintln!("  --lineups <A01,B01,...>    Override the selected lineups");
    eprintln!("  --granularity <pdu|subfeed>");
    eprintln!("  --subfeed-policy <clamp_to_pdu|unclamped>");
    eprintln!("  --set <slot>=<kW>          Manually override one slot (repeatable)");
    eprintln!("  --csv-out <path>           Export the plan to CSV");
    eprintln!("  --serve                    Serve the plan over HTTP (api feature)");
    eprintln!("  --port <u16>               API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help                     Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the baseline preset is used.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(list: &[&str]) -> CliOptions {
        match parse_args_from(&args(list)) {
            Ok(CliCommand::Run(opts)) => opts,
            other => panic!("expected run options, got {other:?}"),
        }
    }

    #[test]
    fn no_arguments_use_defaults() {
        assert_eq!(run(&[]), CliOptions::default());
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(
            parse_args_from(&args(&["--target-mw", "2", "--help"])),
            Ok(CliCommand::Help)
        );
    }

    #[test]
    fn supports_config_cli() {
        let opts = run(&["--config", "plan.toml"]);
        assert_eq!(
            opts.config.as_deref().and_then(|p| p.to_str()),
            Some("plan.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn config_and_preset_conflict() {
        let err = parse_args_from(&args(&["--config", "a.toml", "--preset", "metered"]));
        assert!(err.unwrap_err().contains("mutually exclusive"));
    }

    #[test]
    fn parses_overrides() {
        let opts = run(&[
            "--preset",
            "metered",
            "--target-mw",
            "2.5",
            "--lineups",
            "A01, B02",
            "--granularity",
            "subfeed",
            "--subfeed-policy",
            "unclamped",
            "--set",
            "3=120.5",
            "--csv-out",
            "out.csv",
            "--serve",
            "--port",
            "8080",
        ]);
        assert_eq!(opts.preset.as_deref(), Some("metered"));
        assert_eq!(opts.target_mw, Some(2.5));
        assert_eq!(opts.lineups, Some(vec!["A01".to_string(), "B02".to_string()]));
        assert_eq!(opts.granularity, Some(Granularity::Subfeed));
        assert_eq!(opts.subfeed_policy, Some(SubfeedPolicy::Unclamped));
        assert_eq!(opts.edits, vec![(3, 120.5)]);
        assert!(opts.serve);
        assert_eq!(opts.port, 8080);
    }

    #[test]
    fn rejects_bad_values() {
        let cases: [&[&str]; 7] = [
            &["--target-mw", "lots"],
            &["--granularity", "rack"],
            &["--set", "3:100"],
            &["--set", "x=1"],
            &["--port", "70000"],
            &["--preset"],
            &["--bogus"],
        ];
        for bad in cases {
            assert!(parse_args_from(&args(bad)).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn overrides_apply_to_config() {
        let opts = run(&["--target-mw", "1.5", "--lineups", "C01", "--granularity", "subfeed"]);
        let mut config = opts.load_config().unwrap();
        opts.apply_overrides(&mut config);
        assert_eq!(config.plan.target_mw, 1.5);
        assert_eq!(config.topology.selected, vec!["C01".to_string()]);
        assert_eq!(config.plan.granularity, Granularity::Subfeed);
    }

    #[test]
    fn unknown_preset_reported() {
        let opts = run(&["--preset", "nope"]);
        assert!(opts.load_config().unwrap_err().contains("unknown preset"));
    }
}

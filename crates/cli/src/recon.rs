//! `rankmerge run` / `rankmerge validate`: config-driven consensus building.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use rankmerge_recon::model::ConsensusResult;
use rankmerge_recon::output::write_table;
use rankmerge_recon::{load_sources, ReconConfig, ReconError};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_REVIEW_PENDING, EXIT_RUNTIME};
use crate::CliError;

/// Rows of the review list printed after a run.
const REVIEW_PREVIEW: usize = 20;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Build the consensus table from a TOML config file
    #[command(after_help = "\
Examples:
  rankmerge run adp.recon.toml
  rankmerge run adp.recon.toml --threshold 90 --review review.csv
  rankmerge run hr.recon.toml --json
  rankmerge run hr.recon.toml --output report.json --strict")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Review threshold (0-100), overrides the config value
        #[arg(long, env = "RANKMERGE_REVIEW_THRESHOLD")]
        threshold: Option<f64>,

        /// Write the consensus CSV here instead of the configured path
        #[arg(long)]
        consensus: Option<PathBuf>,

        /// Write the review CSV here instead of the configured path
        #[arg(long)]
        review: Option<PathBuf>,

        /// Output the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 62 when any player is flagged for review
        #[arg(long)]
        strict: bool,
    },

    /// Validate a config without reading any source
    #[command(after_help = "\
Examples:
  rankmerge validate adp.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, threshold, consensus, review, json, output, strict } => {
            cmd_run(RunArgs {
                config_path: config,
                threshold,
                consensus,
                review,
                json_output: json,
                output_file: output,
                strict,
            })
        }
        ReconCommands::Validate { config } => cmd_validate(config),
    }
}

struct RunArgs {
    config_path: PathBuf,
    threshold: Option<f64>,
    consensus: Option<PathBuf>,
    review: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    strict: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Map an engine error onto an exit code, with a hint where the fix is usually obvious.
fn engine_err(err: ReconError) -> CliError {
    let code = match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        _ => EXIT_RUNTIME,
    };
    let hint = match &err {
        ReconError::SourceUnreadable { .. } => {
            Some("source paths are resolved relative to the config file")
        }
        ReconError::MissingColumn { .. } => {
            Some("map the header names with a [sources.columns] table")
        }
        ReconError::ZeroWeight { .. } => Some("give at least one of these sources a positive weight"),
        _ => None,
    };
    let cli = recon_err(code, err.to_string());
    match hint {
        Some(h) => cli.with_hint(h),
        None => cli,
    }
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;
    ReconConfig::from_toml(&config_str).map_err(engine_err)
}

fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(&args.config_path)?;

    if let Some(t) = args.threshold {
        if !(0.0..=100.0).contains(&t) {
            return Err(CliError::args(format!("--threshold must be within 0..=100, got {t}")));
        }
        config.review_threshold = t;
    }

    // Resolve file paths relative to config file's directory
    let base_dir = args
        .config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    tracing::debug!(
        config = %args.config_path.display(),
        base_dir = %base_dir.display(),
        threshold = config.review_threshold,
        "starting run"
    );

    let input = load_sources(&config, &base_dir).map_err(engine_err)?;
    let result = rankmerge_recon::run(&config, &input).map_err(engine_err)?;

    let source_ids = config.source_ids();
    let decimals = config.output.decimals;

    let consensus_path = args
        .consensus
        .or_else(|| config.output.consensus.as_ref().map(|p| base_dir.join(p)));
    let review_path = args
        .review
        .or_else(|| config.output.review.as_ref().map(|p| base_dir.join(p)));

    let consensus_csv = write_table(&result.players, &source_ids, decimals).map_err(engine_err)?;
    match consensus_path {
        Some(ref path) => write_file(path, &consensus_csv)?,
        // stdout belongs to the JSON report under --json
        None if !args.json_output => print!("{consensus_csv}"),
        None => {}
    }

    if let Some(ref path) = review_path {
        let review_csv = write_table(&result.review, &source_ids, decimals).map_err(engine_err)?;
        write_file(path, &review_csv)?;
    }

    if args.json_output || args.output_file.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| recon_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output_file {
            write_file(path, &json_str)?;
        }
        if args.json_output {
            println!("{json_str}");
        }
    }

    print_summary(&result);

    if args.strict && !result.review.is_empty() {
        return Err(recon_err(
            EXIT_REVIEW_PENDING,
            format!("{} player(s) flagged for review", result.review.len()),
        ));
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| {
        recon_err(EXIT_RUNTIME, format!("cannot write {}: {e}", path.display()))
    })?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

/// Human summary and low-confidence list, to stderr.
fn print_summary(result: &ConsensusResult) {
    let s = &result.summary;
    eprintln!(
        "{} '{}': {} players ({} multi-source, {} single-source), {} flagged for review",
        result.meta.policy,
        result.meta.config_name,
        s.total_players,
        s.multi_source,
        s.single_source,
        s.flagged,
    );

    if s.rows_skipped > 0 {
        eprintln!("skipped {} malformed row(s)", s.rows_skipped);
    }
    if s.conflicts > 0 {
        eprintln!("{} cluster conflict(s)", s.conflicts);
    }

    if result.review.is_empty() {
        return;
    }

    eprintln!(
        "review ({} flagged, threshold {}, least confident first):",
        result.review.len(),
        result.meta.review_threshold
    );
    for p in result.review.iter().take(REVIEW_PREVIEW) {
        let sources: Vec<&str> = p.per_source_values.keys().map(String::as_str).collect();
        eprintln!(
            "  {:>6.2}  {} [{}]",
            p.confidence_score,
            p.canonical_name,
            sources.join(", "),
        );
    }
    if result.review.len() > REVIEW_PREVIEW {
        eprintln!("  ... and {} more", result.review.len() - REVIEW_PREVIEW);
    }
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: {} '{}' with {} source(s), review threshold {}",
        config.policy,
        config.name,
        config.sources.len(),
        config.review_threshold,
    );
    Ok(())
}

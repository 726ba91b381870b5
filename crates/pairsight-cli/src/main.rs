//! pairsight: characterize images and compare them from the command line.
//!
//! Decodes image files, runs the heuristic analysis from
//! `pairsight-analysis`, and prints labels, shapes, composition and color
//! statistics, or a similarity verdict for two images.
//!
//! # Usage
//!
//! ```text
//! pairsight analyze [--json] [--diagnostics] <IMAGE>...
//! pairsight compare [--json] <FIRST> <SECOND>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod decode;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use pairsight_analysis::diagnostics::Clock;
use pairsight_analysis::{AnalysisConfig, AnalysisError};
use tracing::Level;

use crate::decode::DecodeError;
use crate::report::{ComparisonReport, ImageReport};

/// Heuristic image characterization and comparison.
#[derive(Parser)]
#[command(name = "pairsight", version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more images.
    ///
    /// Images are decoded and analyzed concurrently, one worker thread
    /// per image; output follows argument order.
    Analyze {
        /// Input images (PNG, JPEG, BMP, WebP).
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Include per-stage timing and intermediate values.
        #[arg(long)]
        diagnostics: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Compare two images and report a similarity score.
    Compare {
        /// First image.
        first: PathBuf,

        /// Second image.
        second: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Output JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Analysis thresholds as a JSON object.
    ///
    /// Fields that are omitted keep their defaults, e.g.
    /// `{"focus_margin": 10.0}`.
    #[arg(long)]
    config_json: Option<String>,
}

/// Everything that can stop the CLI.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    #[error(transparent)]
    Config(AnalysisError),

    #[error("{}: {source}", .path.display())]
    Decode { path: PathBuf, source: DecodeError },

    #[error("{}: analysis refused: {source}", .path.display())]
    Analysis {
        path: PathBuf,
        source: AnalysisError,
    },

    #[error("analysis worker for {} panicked", .path.display())]
    Worker { path: PathBuf },

    #[error("error serializing output: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, CliError> {
    match command {
        Command::Analyze {
            images,
            diagnostics,
            common,
        } => {
            let config = config_from_args(&common)?;
            let reports = analyze_all(&images, &config, diagnostics)?;
            if common.json {
                serde_json::to_string_pretty(&reports).map_err(CliError::Serialize)
            } else {
                Ok(reports
                    .iter()
                    .map(ImageReport::render)
                    .collect::<Vec<_>>()
                    .join("\n\n"))
            }
        }
        Command::Compare {
            first: first_path,
            second: second_path,
            common,
        } => {
            let config = config_from_args(&common)?;
            let (first, second) = std::thread::scope(|scope| {
                let worker = scope.spawn(|| analyze_one(&first_path, &config, false));
                let second = analyze_one(&second_path, &config, false);
                let first = worker.join().unwrap_or_else(|_| {
                    Err(CliError::Worker {
                        path: first_path.clone(),
                    })
                });
                Ok::<_, CliError>((first?, second?))
            })?;

            let comparison = pairsight_analysis::compare(&first.analysis, &second.analysis);
            tracing::info!(score = comparison.score, "compared images");
            let report = ComparisonReport {
                first,
                second,
                comparison,
            };
            if common.json {
                serde_json::to_string_pretty(&report).map_err(CliError::Serialize)
            } else {
                Ok(report.render())
            }
        }
    }
}

/// Build an [`AnalysisConfig`] from `--config-json`, or the defaults.
fn config_from_args(args: &CommonArgs) -> Result<AnalysisConfig, CliError> {
    let config = match &args.config_json {
        Some(json) => serde_json::from_str(json).map_err(CliError::ConfigJson)?,
        None => AnalysisConfig::default(),
    };
    config.validate().map_err(CliError::Config)?;
    tracing::debug!(?config, "analysis config");
    Ok(config)
}

/// Decode and analyze every image on its own scoped thread.
///
/// Reports come back in input order. The first failure (in input order)
/// is returned.
fn analyze_all<'a>(
    paths: &'a [PathBuf],
    config: &AnalysisConfig,
    with_diagnostics: bool,
) -> Result<Vec<ImageReport<'a>>, CliError> {
    std::thread::scope(|scope| {
        let workers: Vec<_> = paths
            .iter()
            .map(|path| {
                let handle = scope.spawn(move || analyze_one(path, config, with_diagnostics));
                (path, handle)
            })
            .collect();

        workers
            .into_iter()
            .map(|(path, handle)| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(CliError::Worker { path: path.clone() }),
            })
            .collect()
    })
}

fn analyze_one<'a>(
    path: &'a Path,
    config: &AnalysisConfig,
    with_diagnostics: bool,
) -> Result<ImageReport<'a>, CliError> {
    tracing::info!(path = %path.display(), "analyzing");
    let buffer = decode::load(path).map_err(|source| CliError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let refused = |source| CliError::Analysis {
        path: path.to_path_buf(),
        source,
    };

    let (analysis, diagnostics) = if with_diagnostics {
        let (analysis, diagnostics) =
            pairsight_analysis::analyze_with_diagnostics(&buffer, config, &StdClock)
                .map_err(refused)?;
        (analysis, Some(diagnostics))
    } else {
        let analysis = pairsight_analysis::analyze_with_config(&buffer, config).map_err(refused)?;
        (analysis, None)
    };

    Ok(ImageReport {
        path,
        width: buffer.width(),
        height: buffer.height(),
        analysis,
        diagnostics,
    })
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

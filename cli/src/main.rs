//! landmark-records
//!
//! Build, verify and count landmark training containers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, error, info};

use landmark_core::constants::layout;
use landmark_core::prelude::*;
use landmark_core::telemetry::{Stage, TelemetrySnapshot};

#[derive(Parser, Debug)]
#[command(name = "landmark-records", version, about)]
struct Opts {
    /// JSON config file; unset keys keep their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Pair images with landmark files and write a container
    Build {
        #[arg(long, value_name = "DIR", default_value = layout::TRAINING_DIR)]
        training_dir: PathBuf,
        #[arg(long, short, value_name = "FILE", default_value = layout::OUTPUT_FILE)]
        output: PathBuf,
    },
    /// Decode every record and report corruption
    Verify {
        #[arg(long, short, value_name = "FILE", default_value = layout::OUTPUT_FILE)]
        input: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count frames; fails on the first corrupt one
    Count {
        #[arg(long, short, value_name = "FILE", default_value = layout::OUTPUT_FILE)]
        input: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<DatasetConfig> {
    match path {
        Some(p) => DatasetConfig::from_json_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(DatasetConfig::default()),
    }
}

fn log_stages(telemetry: &TelemetrySnapshot) {
    for stage in Stage::ALL {
        debug!("{:>8}: {:.3} ms", stage.name(), telemetry.stages.get_ms(stage));
    }
    debug!("{:>8}: {:.3} ms", "elapsed", telemetry.elapsed.as_secs_f64() * 1_000.0);
}

fn build(cfg: &DatasetConfig, training_dir: &Path, output: &Path) -> Result<bool> {
    let report = build_container(training_dir, output, cfg)
        .with_context(|| format!("building {} from {}", output.display(), training_dir.display()))?;

    for s in &report.skipped {
        info!("skipped {}: {}", s.stem, s.reason);
    }
    info!(
        "processing completed: {}/{} samples saved to {}",
        report.processed,
        report.total,
        output.display()
    );
    log_stages(&report.telemetry);
    Ok(true)
}

fn verify(cfg: &DatasetConfig, input: &Path, json: bool) -> Result<bool> {
    let report = verify_container(input, cfg).with_context(|| format!("verifying {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("dataset total samples: {}", report.valid);
        for (i, p) in report.preview.iter().enumerate() {
            println!(
                "sample {}: {} (image {} bytes, {} landmark values, offset {})",
                i + 1,
                p.filename,
                p.image_len,
                p.landmark_count,
                p.offset
            );
        }
        if report.decode_failures > 0 || report.checksum_failures > 0 {
            println!(
                "corrupt frames: {}, undecodable records: {}",
                report.checksum_failures, report.decode_failures
            );
        }
        if let Some(e) = &report.terminal_error {
            println!("scan ended early: {}", e);
        }
    }
    log_stages(&report.telemetry);
    Ok(report.is_clean())
}

fn count(cfg: &DatasetConfig, input: &Path) -> Result<bool> {
    let file = ContainerFile::with_config(input, cfg.reader_config())
        .with_context(|| format!("opening {}", input.display()))?;
    let n = file.count().with_context(|| format!("counting {}", input.display()))?;
    println!("{}", n);
    Ok(true)
}

fn run(opts: &Opts) -> Result<bool> {
    let cfg = load_config(opts.config.as_deref())?;
    match &opts.subcmd {
        SubCommand::Build { training_dir, output } => build(&cfg, training_dir, output),
        SubCommand::Verify { input, json } => verify(&cfg, input, *json),
        SubCommand::Count { input } => count(&cfg, input),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    match run(&opts) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

//! `generate` -- build a region datafile from a content directory.
//!
//! ```bash
//! generate regions/krakow --lang pl --output datafile.json --pretty
//! RUST_LOG=region_data=debug generate . > datafile.json
//! ```
//!
//! Logs go to stderr so the datafile can be piped from stdout.

mod config;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use region_data::{Aggregator, Datafile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Cli, GenerateConfig, Output};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "region_data=info,generate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(Outcome::Written) => ExitCode::SUCCESS,
        Ok(Outcome::Denied) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// How a run that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Written,
    /// Missing images with `--deny-missing-assets`; nothing was written.
    Denied,
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = GenerateConfig::resolve(cli)?;

    if config.parallel && !cfg!(feature = "parallel") {
        tracing::warn!("built without the `parallel` feature; loading sequentially");
    }

    let aggregation = Aggregator::new(&config.root, &config.lang)
        .parallel(config.parallel)
        .run()
        .with_context(|| format!("generate datafile from {}", config.root.display()))?;

    if config.list_images {
        for path in aggregation.datafile.image_paths() {
            tracing::info!(path = %path.display(), "image");
        }
    }

    if !aggregation.warnings.is_empty() {
        tracing::warn!(count = aggregation.warnings.len(), "referenced images are missing");
        if config.deny_missing_assets {
            for warning in &aggregation.warnings {
                tracing::error!("{warning}");
            }
            tracing::error!("missing images denied; no datafile written");
            return Ok(Outcome::Denied);
        }
    }

    write_datafile(&config, &aggregation.datafile)?;
    Ok(Outcome::Written)
}

fn write_datafile(config: &GenerateConfig, datafile: &Datafile) -> anyhow::Result<()> {
    let mut json = if config.pretty {
        serde_json::to_vec_pretty(datafile)
    } else {
        serde_json::to_vec(datafile)
    }
    .context("serialize datafile")?;
    json.push(b'\n');

    match &config.output {
        Output::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json).context("write datafile to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
        Output::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            std::fs::write(path, &json).with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = json.len(), "wrote datafile");
        }
    }
    Ok(())
}

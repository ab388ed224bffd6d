use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epsfhir_core::{
    CharacterNormalizer, DocumentBuilder, OutputTarget, PrescriptionData, RunConfig, run_batch,
};

#[derive(Parser)]
#[command(name = "epsfhir")]
#[command(about = "Convert prescription extracts into FHIR message bundles")]
struct Cli {
    /// Properties file with sender identity and output settings
    config: PathBuf,
    /// Tab-separated prescription records
    prescriptions: PathBuf,
    /// Tab-separated line-item records
    items: PathBuf,
    /// Output directory, or `-` for standard output (default: current directory)
    output: Option<String>,
}

/// Entry point for the `epsfhir` converter
///
/// Reads the configuration, checks the output target, loads both extract files and then
/// writes one bundle per prescription. Logs go to stderr so documents streamed to stdout
/// stay parseable.
///
/// # Environment Variables
/// - `RUST_LOG`: log filter (default directive: `epsfhir=info`)
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("epsfhir=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let normalizer =
        CharacterNormalizer::new().context("failed to build placeholder substitution table")?;

    let config = RunConfig::load(&cli.config)
        .with_context(|| format!("failed to read configuration {}", cli.config.display()))?;

    let target = OutputTarget::from_arg(cli.output.as_deref());
    target.validate().context("output target rejected")?;

    let data = PrescriptionData::load(&normalizer, &cli.prescriptions, &cli.items)
        .context("failed to load prescription extracts")?;

    tracing::info!(
        prescriptions = data.len(),
        format = ?config.format,
        immediate_fail = config.immediate_fail,
        "++ Starting conversion"
    );

    let builder = DocumentBuilder::new(config.sender);
    let mut sink = target.open_sink();
    let summary = run_batch(
        &data,
        &builder,
        config.format,
        sink.as_mut(),
        config.immediate_fail,
    )
    .context("conversion stopped at first failing prescription")?;

    if summary.failed_count() > 0 {
        tracing::warn!(failed = ?summary.failed, "some prescriptions were not converted");
    }
    Ok(())
}

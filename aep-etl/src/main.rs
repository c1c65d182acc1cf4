//! aep-etl - Africa Energy Portal ETL pipeline
//!
//! Stages:
//!   1. Extract country payloads from the portal (retrying, fan-out)
//!   2. Normalize into the canonical dense-year schema
//!   3. Store via idempotent upserts
//!   4. Validate and write the data-quality report

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aep_common::config::Settings;
use aep_etl::fetch::PortalClient;
use aep_etl::pipeline::Pipeline;
use aep_etl::report;
use aep_etl::store::MetricStore;

/// Command-line arguments for aep-etl
#[derive(Parser, Debug)]
#[command(name = "aep-etl")]
#[command(about = "Africa Energy Portal ETL pipeline")]
#[command(version)]
struct Args {
    /// Subset of countries to process (default: all)
    #[arg(long, num_args = 1.., value_name = "COUNTRY")]
    countries: Vec<String>,

    /// Skip the store stage (normalize + validate only)
    #[arg(long)]
    dry_run: bool,

    /// Fetch a single country's payload and save its raw artifact, then exit
    #[arg(long, value_name = "COUNTRY", conflicts_with_all = ["countries", "dry_run"])]
    dump_country: Option<String>,

    /// Export the stored collection to a flat CSV file, then exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["countries", "dry_run", "dump_country"])]
    export_csv: Option<PathBuf>,

    /// Reports/artifacts directory
    #[arg(long, env = "AEP_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,

    /// SQLite connection string for the metric store
    #[arg(long, env = "AEP_DATABASE_URL")]
    database_url: Option<String>,

    /// TOML config file (default: <config dir>/aep-etl/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aep_etl=info,aep_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting aep-etl v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::resolve(args.config.as_deref())
        .context("Failed to resolve configuration")?;
    if let Some(dir) = args.reports_dir {
        settings.reports_dir = dir;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }

    info!(
        base_url = %settings.base_url,
        reports_dir = %settings.reports_dir.display(),
        max_retries = settings.max_retries,
        concurrency = settings.concurrency,
        "Configuration resolved"
    );

    if let Some(path) = args.export_csv {
        let store = MetricStore::connect(&settings.database_url).await?;
        let docs = store.fetch_all().await?;
        report::export_metrics_csv(&path, &docs)?;
        return Ok(());
    }

    let fetcher = PortalClient::new(
        &settings.base_url,
        Duration::from_secs(settings.fetch_timeout_secs),
    )
    .context("Failed to build portal client")?;

    let pipeline = Pipeline::new(fetcher, settings);

    if let Some(country) = args.dump_country {
        let written = pipeline.dump_country(&country).await?;
        for path in written {
            info!(file = %path.display(), "Raw artifact saved");
        }
        return Ok(());
    }

    let countries = (!args.countries.is_empty()).then_some(args.countries.as_slice());
    let summary = pipeline.run(countries, args.dry_run).await?;

    info!(
        run_id = %summary.run_id,
        raw_rows = summary.raw_rows,
        documents = summary.documents,
        upserted = summary.write.upserted,
        modified = summary.write.modified,
        rows_with_gaps = summary.validation.rows_with_gaps,
        unit_conflicts = summary.validation.unit_conflicts,
        missing_countries = summary.validation.missing_countries,
        total_secs = summary.total_secs,
        "Run summary"
    );

    Ok(())
}

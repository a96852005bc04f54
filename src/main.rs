//! CLI entry point for the speed tier tool.
//!
//! Provides subcommands for exporting speed tiers from cached usage
//! statistics, listing cached formats, and refreshing the cache.

mod infra;
mod services;

use crate::infra::smogon::client::SmogonClient;
use crate::services::stats_catalog::StatsCatalog;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use speed_tiers::matcher::resolve_display_names;
use speed_tiers::{
    TierConfig, compute_speed_tiers,
    output::{
        export_file_name, format_listing, print_pretty, summary_rows, tier_rows, write_csv,
        write_json,
    },
    parser::{NameTable, parse_name_table},
    store::{FORMAT_NAMES_FILE, POKEDEX_FILE, SnapshotStore, StatsMonth},
};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "speed_tiers")]
#[command(about = "Compute competitive speed tiers from usage statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute speed tiers for a format and export them
    Export {
        /// Format code (e.g. gen9vgc2025regi)
        #[arg(value_name = "FORMAT")]
        format: String,

        /// Minimum rating cutoff; defaults to the highest cached one
        #[arg(value_name = "RATING")]
        rating: Option<u32>,

        /// Directory to write exported files to
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// JSON file mapping species names to translated display names
        #[arg(short, long)]
        translate: Option<String>,

        /// Write a JSON report instead of CSV tables
        #[arg(long, default_value_t = false)]
        json: bool,

        /// JSON file overriding tier computation constants
        #[arg(short, long)]
        config: Option<String>,

        /// Directory holding cached statistics
        #[arg(short, long, default_value = "stats")]
        data_dir: String,
    },
    /// List cached formats and their rating cutoffs
    ListFormats {
        /// Directory holding cached statistics
        #[arg(short, long, default_value = "stats")]
        data_dir: String,
    },
    /// Download last month's statistics and reference data
    Update {
        /// Directory holding cached statistics
        #[arg(short, long, default_value = "stats")]
        data_dir: String,

        /// Maximum number of concurrent snapshot downloads
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,

        /// Gzip compress cached files
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Delete cached snapshots older than the downloaded month
        #[arg(long, default_value_t = false)]
        clean: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/speed_tiers.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("speed_tiers.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            format,
            rating,
            output_dir,
            translate,
            json,
            config,
            data_dir,
        } => {
            let config = match config {
                Some(path) => TierConfig::load(&path)?,
                None => TierConfig::default(),
            };
            let translations = translate.as_deref().map(load_translations).transpose()?;

            export(
                &SnapshotStore::new(data_dir),
                &format,
                rating,
                Path::new(&output_dir),
                translations.as_ref(),
                json,
                &config,
            )?;
        }
        Commands::ListFormats { data_dir } => {
            list_formats(&SnapshotStore::new(data_dir))?;
        }
        Commands::Update {
            data_dir,
            concurrency,
            gzip,
            clean,
        } => {
            let catalog = Arc::new(SmogonClient::new()?);
            let store = SnapshotStore::new(data_dir);
            update(catalog, store, concurrency, gzip, clean).await?;
        }
    }

    Ok(())
}

fn load_translations(path: &str) -> Result<NameTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading translations '{path}'"))?;
    let table = parse_name_table(&bytes)?;
    info!(count = table.len(), "Loaded translations");
    Ok(table)
}

/// Picks the requested rating, or the highest cached one when none is given.
fn resolve_rating(
    store: &SnapshotStore,
    format: &str,
    rating: Option<u32>,
    today: NaiveDate,
) -> Result<u32> {
    let available = store.available_ratings(format, today)?;
    let Some(&highest) = available.last() else {
        bail!("No data files found for format '{format}'");
    };

    match rating {
        Some(r) if available.contains(&r) => Ok(r),
        Some(r) => {
            let listed: Vec<String> = available.iter().map(u32::to_string).collect();
            bail!(
                "Rating {r} is not available for format '{format}' (available: {})",
                listed.join(", ")
            )
        }
        None => {
            info!(rating = highest, "Rating not specified, using highest rating");
            Ok(highest)
        }
    }
}

/// Loads cached data, computes tiers and writes the export files.
#[tracing::instrument(skip(store, translations, config), fields(data_dir = %store.data_dir().display()))]
fn export(
    store: &SnapshotStore,
    format: &str,
    rating: Option<u32>,
    output_dir: &Path,
    translations: Option<&NameTable>,
    json: bool,
    config: &TierConfig,
) -> Result<()> {
    let now = Local::now().naive_local();
    let rating = resolve_rating(store, format, rating, now.date())?;

    let loaded = store
        .load_usage(format, rating, now.date())?
        .ok_or_else(|| anyhow!("Unable to get usage data for {format} (rating {rating}+)"))?;
    info!(
        species = loaded.snapshot.data.len(),
        month = %loaded.month,
        stale = loaded.stale,
        battles = loaded.snapshot.info.battles,
        "Usage data loaded"
    );

    let reference = store.load_reference()?;
    info!(species = reference.len(), "Reference data loaded");

    let report = compute_speed_tiers(&loaded.snapshot.data, format, &reference, config);
    print_pretty(&report);

    if report.skipped.skipped_species() > 0 || report.skipped.malformed_spreads > 0 {
        warn!(
            unmatched = report.skipped.unmatched_species,
            empty = report.skipped.empty_build_distribution,
            malformed_spreads = report.skipped.malformed_spreads,
            "Some usage data was skipped"
        );
    }
    if report.tiers.is_empty() {
        warn!("No speed tier data calculated");
        return Ok(());
    }

    let format_names = store.load_name_table(FORMAT_NAMES_FILE)?;
    let display_name = format_names
        .get(format)
        .map(String::as_str)
        .unwrap_or(format);
    std::fs::create_dir_all(output_dir)?;

    let written = if json {
        let path = output_dir.join(export_file_name(display_name, rating, now, "json"));
        write_json(&path, &report)?;
        vec![path]
    } else {
        let tiers_path = output_dir.join(export_file_name(display_name, rating, now, "csv"));
        let summary_path =
            output_dir.join(export_file_name(display_name, rating, now, "summary.csv"));
        write_csv(&tiers_path, &tier_rows(&report, translations))?;
        write_csv(&summary_path, &summary_rows(&report, translations))?;
        vec![tiers_path, summary_path]
    };

    for path in &written {
        info!(path = %path.display(), "Export written");
    }
    info!(
        tiers = report.tiers.len(),
        records = report.membership_count(),
        "Export complete"
    );
    Ok(())
}

fn list_formats(store: &SnapshotStore) -> Result<()> {
    let today = Local::now().date_naive();
    let formats = store.available_formats(today)?;
    if formats.is_empty() {
        warn!(data_dir = %store.data_dir().display(), "No cached formats found");
        return Ok(());
    }

    let names = store.load_name_table(FORMAT_NAMES_FILE)?;
    for (name, format) in format_listing(&formats, &names) {
        let ratings = store.available_ratings(format, today)?;
        info!(format, name, ratings = ?ratings, "Format");
    }

    info!(total = formats.len(), "Format list complete");
    Ok(())
}

/// Refreshes the reference dex, downloads every snapshot of the last complete
/// month that is not cached yet, and regenerates format display names.
///
/// With `clean`, snapshots from earlier months are deleted afterwards.
#[tracing::instrument(skip(catalog, store), fields(data_dir = %store.data_dir().display()))]
async fn update<C>(
    catalog: Arc<C>,
    store: SnapshotStore,
    concurrency: usize,
    gzip: bool,
    clean: bool,
) -> Result<()>
where
    C: StatsCatalog + Send + Sync + 'static,
{
    let today = Local::now().date_naive();
    let month = StatsMonth::last_complete(today);
    info!(month = %month, "Starting statistics update");

    match catalog.fetch_pokedex().await {
        Ok(bytes) => {
            store.write(POKEDEX_FILE, &bytes, gzip)?;
            info!("Reference dex updated");
        }
        Err(e) => error!(error = %e, "Failed to fetch reference dex"),
    }

    let links = catalog.list_snapshots(month).await?;
    let pending: Vec<_> = links
        .into_iter()
        .filter(|link| {
            let cached = store.contains(&link.file_name);
            if cached {
                info!(file = %link.file_name, "Already cached, skipping download");
            }
            !cached
        })
        .collect();

    info!(pending = pending.len(), "Snapshots ready for download");

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut tasks = vec![];

    for link in pending {
        let sem = semaphore.clone();
        let catalog = catalog.clone();
        let store = store.clone();

        let span = tracing::info_span!("download_snapshot", file = %link.file_name);

        let task = tokio::spawn(
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return false;
                };

                match catalog.download(&link.url).await {
                    Ok(bytes) => match store.write(&link.file_name, &bytes, gzip) {
                        Ok(_) => true,
                        Err(e) => {
                            error!(error = %e, "Failed to cache snapshot");
                            false
                        }
                    },
                    Err(e) => {
                        error!(url = %link.url, error = %e, "Snapshot download failed");
                        false
                    }
                }
            }
            .instrument(span),
        );

        tasks.push(task);
    }

    let mut downloaded = 0;
    for task in tasks {
        if matches!(task.await, Ok(true)) {
            downloaded += 1;
        }
    }
    info!(downloaded, "Snapshot downloads finished");

    if clean {
        let removed = store.prune_before(month)?;
        info!(removed, keep = %month, "Outdated snapshots removed");
    }

    match catalog.fetch_format_names().await {
        Ok(names) => {
            let codes = store.available_formats(today)?;
            let table = resolve_display_names(&codes, &names);
            store.write(FORMAT_NAMES_FILE, &serde_json::to_vec(&table)?, false)?;
            info!(formats = table.len(), "Format names updated");
        }
        Err(e) => error!(error = %e, "Failed to generate format list"),
    }

    info!("Update completed");
    Ok(())
}

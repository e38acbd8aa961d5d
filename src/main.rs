use analytics::PeriodSelection;
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{FileConfigStore, ZoneConfig, ZoneConfigOverrides, init_tracing, load_config};
use core_types::{DataRecord, DeviationMode, Zone};
use engine::{EngineEvent, Orchestrator, Snapshot, fetch_config, persist_config};
use std::path::{Path, PathBuf};

/// The main entry point for the bandwatch CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; BANDWATCH_* and RUST_LOG may come from it.
    dotenvy::dotenv().ok();

    let log_dir = std::env::var_os("BANDWATCH_LOG_DIR").map(PathBuf::from);
    let _log_guard = init_tracing(log_dir.as_deref());

    // Parse command-line arguments
    let cli = Cli::parse();
    let store = FileConfigStore::new(&cli.store);

    // Execute the appropriate command
    match cli.command {
        Commands::Classify(args) => handle_classify(args, cli.config.as_deref(), &store).await,
        Commands::Config(ConfigCommand::Show) => handle_config_show(cli.config.as_deref(), &store).await,
        Commands::Config(ConfigCommand::Set(overrides)) => {
            handle_config_set(overrides, cli.config.as_deref(), &store).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Classifies forecast deviations into green, amber and red zones.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with zone settings (defaults to ./bandwatch.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the persisted relative-error thresholds.
    #[arg(long, global = true, default_value = "bandwatch-thresholds.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a dataset and print zones, bands and counts.
    Classify(ClassifyArgs),
    /// Inspect or change the persisted thresholds.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Validate and persist new relative-error thresholds.
    Set(ZoneConfigOverrides),
}

#[derive(Parser)]
struct ClassifyArgs {
    /// JSON array of records (`date`, `actual`, `expected`, ...).
    input: PathBuf,

    /// Deviation model: relative-error or sigma.
    #[arg(long, default_value = "relative-error")]
    mode: DeviationMode,

    /// Tolerance offset added to the green ceiling (relative-error mode).
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,

    /// Only keep these years, e.g. --years 2019,2020.
    #[arg(long, value_delimiter = ',')]
    years: Vec<i32>,

    /// Only keep these quarters (1-4), e.g. --quarters 1,2.
    #[arg(long, value_delimiter = ',')]
    quarters: Vec<u32>,

    /// Derive rolling mean/std over this many preceding records.
    #[arg(long)]
    rolling_window: Option<usize>,

    /// Print the full snapshot as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Do not read the persisted thresholds.
    #[arg(long)]
    offline: bool,

    #[command(flatten)]
    overrides: ZoneConfigOverrides,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_classify(
    args: ClassifyArgs,
    config_path: Option<&Path>,
    store: &FileConfigStore,
) -> anyhow::Result<()> {
    let base = load_config(config_path).context("Failed to load zone configuration")?;

    let mut engine = Orchestrator::new(base)?;
    if let Some(window) = args.rolling_window {
        engine = engine.with_rolling_window(window)?;
    }

    let mut config = base;
    if !args.offline {
        let fetched = fetch_config(store, &base).await;
        if let Some(notice) = fetched.notice {
            engine.push_notice(notice);
        }
        config = fetched.config;
    }
    let candidate = args.overrides.apply_to(&config);
    engine
        .handle(EngineEvent::ConfigApplied(candidate))
        .context("Command-line overrides were rejected")?;

    let records = read_records(&args.input).await?;
    engine.handle(EngineEvent::ModeSwitched(args.mode))?;
    engine.handle(EngineEvent::ToleranceChanged(args.tolerance))?;
    engine.handle(EngineEvent::FilterChanged(PeriodSelection::new(args.years, args.quarters)))?;
    let snapshot = engine.handle(EngineEvent::DatasetLoaded(records))?;

    if args.json {
        println!("{}", snapshot.to_json()?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

async fn handle_config_show(config_path: Option<&Path>, store: &FileConfigStore) -> anyhow::Result<()> {
    let base = load_config(config_path).context("Failed to load zone configuration")?;
    let fetched = fetch_config(store, &base).await;
    if let Some(notice) = &fetched.notice {
        eprintln!("warning: {notice}");
    }
    print_config(&fetched.config);
    Ok(())
}

async fn handle_config_set(
    overrides: ZoneConfigOverrides,
    config_path: Option<&Path>,
    store: &FileConfigStore,
) -> anyhow::Result<()> {
    if overrides.is_empty() {
        anyhow::bail!(
            "Nothing to set; pass at least one of --green-upper-base, --amber-width, \
             --std-green-upper, --std-amber-upper"
        );
    }
    let base = load_config(config_path).context("Failed to load zone configuration")?;
    let current = fetch_config(store, &base).await.config;

    let outcome = persist_config(store, &overrides.apply_to(&current))
        .await
        .context("New thresholds were rejected")?;
    match &outcome.notice {
        Some(notice) => eprintln!("warning: {notice}"),
        None => tracing::info!(path = %store.path().display(), "Thresholds saved."),
    }
    print_config(&outcome.config);
    Ok(())
}

async fn read_records(path: &Path) -> anyhow::Result<Vec<DataRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<DataRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))?;
    tracing::info!(records = records.len(), path = %path.display(), "Records read.");
    Ok(records)
}

// ==============================================================================
// Output
// ==============================================================================

fn zone_color(zone: Zone) -> Color {
    match zone {
        Zone::Green => Color::Green,
        Zone::Amber => Color::Yellow,
        Zone::Red => Color::Red,
        Zone::Unknown => Color::DarkGrey,
    }
}

fn fmt_value(value: f64) -> String {
    if value.is_finite() { format!("{value:.2}") } else { "-".to_string() }
}

fn print_snapshot(snapshot: &Snapshot) {
    let score_header = match snapshot.mode {
        DeviationMode::RelativeError => "Deviation %",
        DeviationMode::Sigma => "Z-score",
    };

    let mut points = Table::new();
    points
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Actual", "Expected", score_header, "Green band", "Zone"]);
    for i in 0..snapshot.len() {
        let zone = snapshot.zones[i];
        points.add_row(vec![
            Cell::new(&snapshot.x_labels[i]),
            Cell::new(fmt_value(snapshot.records[i].actual_or_nan())),
            Cell::new(fmt_value(snapshot.expected[i])),
            Cell::new(snapshot.scores[i].map_or_else(|| "-".to_string(), fmt_value)),
            Cell::new(format!(
                "{} – {}",
                fmt_value(snapshot.bands.green.lower[i]),
                fmt_value(snapshot.bands.green.upper[i])
            )),
            Cell::new(zone).fg(zone_color(zone)),
        ]);
    }
    println!("{points}");

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL).set_header(vec!["Zone", "Legend", "Count"]);
    for zone in Zone::ALL {
        let legend = snapshot.legend.for_zone(zone).unwrap_or("No usable deviation");
        summary.add_row(vec![
            Cell::new(zone).fg(zone_color(zone)),
            Cell::new(legend),
            Cell::new(snapshot.counts.get(zone)),
        ]);
    }
    println!("{summary}");

    if let Some(stats) = snapshot.stats {
        println!("Residual mean {:.4}, std {:.4}", stats.mean, stats.std);
    }
    for notice in &snapshot.notices {
        eprintln!("warning: {notice}");
    }
}

fn print_config(config: &ZoneConfig) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    let rows = [
        ("green_upper_base (%)", config.green_upper_base),
        ("amber_width (%)", config.amber_width),
        ("std_green_upper (σ)", config.std_green_upper),
        ("std_amber_upper (σ)", config.std_amber_upper),
        ("tolerance_min (%)", config.tolerance_min),
        ("tolerance_max (%)", config.tolerance_max),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("{table}");
}

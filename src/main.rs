use std::{io, path::PathBuf, process::ExitCode};

use chrono::Local;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;

use laptrack::{
    AppConfig, ChartConfig, ColorMode, ConfigUpdate, Dashboard, DashboardRecords, ExportMode,
    FileBasedStore, FileSummary, LaptrackError,
    chart::build_lap_series,
    dashboard::{calculate_file_summaries, find_records, format_summary_rows},
    import_path,
    laps::store::{Collection, LapStore},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a .tcx file or every .tcx file in a folder into the lap store
    Import {
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ExportMode::Both)]
        mode: ExportMode,

        #[arg(short, long)]
        store: Option<PathBuf>,
    },
    /// Print the lap chart configuration
    Series {
        #[arg(short, long)]
        store: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        color: Option<ColorMode>,
    },
    /// Print per-file summaries and records
    Summary {
        #[arg(short, long)]
        store: Option<PathBuf>,
    },
    /// Print all dashboard data
    Dashboard {
        #[arg(short, long)]
        store: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        color: Option<ColorMode>,
    },
    /// Print the saved settings, updating them first when options are given
    Config {
        #[arg(long)]
        store_dir: Option<PathBuf>,

        #[arg(long, value_enum)]
        color: Option<ColorMode>,

        /// Shortest lap distance in meters counted as a valid lap
        #[arg(long)]
        min_valid_lap_distance: Option<f64>,

        /// Keep one detailed row in every this many
        #[arg(long)]
        sample_interval: Option<usize>,
    },
}

#[derive(Serialize)]
struct SummaryOutput {
    summaries: Vec<FileSummary>,
    records: DashboardRecords,
}

fn open_store(config: &AppConfig, store: Option<PathBuf>) -> Result<FileBasedStore, LaptrackError> {
    let path = match store {
        Some(path) => path,
        None => config.store_path()?,
    };
    info!("Using lap store {:?}", path);
    FileBasedStore::new(path)
}

fn print_json(value: &impl Serialize) -> Result<(), LaptrackError> {
    serde_json::to_writer_pretty(io::stdout().lock(), value)
        .map_err(|e| LaptrackError::OutputSerializeError { source: e })?;
    println!();
    Ok(())
}

fn import(
    config: &AppConfig,
    input: PathBuf,
    mode: ExportMode,
    store: Option<PathBuf>,
) -> Result<(), LaptrackError> {
    let mut store = open_store(config, store)?;
    let reports = import_path(&input, mode, &mut store)?;
    for report in &reports {
        info!(
            "{} ({}): {} laps, {} trackpoints",
            report.source, report.date, report.summary_records, report.detailed_records
        );
    }
    info!("Imported {} activity files", reports.len());
    Ok(())
}

fn series(
    config: &AppConfig,
    store: Option<PathBuf>,
    color: Option<ColorMode>,
) -> Result<(), LaptrackError> {
    let store = open_store(config, store)?;
    let grouped = store.load_grouped(Collection::Summary)?;
    if grouped.is_empty() {
        warn!("Lap store has no summary records");
    }
    let mut colors = color.unwrap_or(config.color_mode).source();
    let chart = ChartConfig::lap_chart(build_lap_series(&grouped, colors.as_mut()));
    print_json(&chart)
}

fn summary(config: &AppConfig, store: Option<PathBuf>) -> Result<(), LaptrackError> {
    let store = open_store(config, store)?;
    let grouped = store.load_grouped(Collection::Summary)?;
    let laps = format_summary_rows(grouped.records().cloned());
    let file_summaries = calculate_file_summaries(&laps, config.min_valid_lap_distance_m);
    let records = find_records(
        laps.records(),
        &file_summaries.summaries,
        config.min_valid_lap_distance_m,
    );
    print_json(&SummaryOutput {
        summaries: file_summaries.summaries,
        records,
    })
}

fn dashboard(
    config: &AppConfig,
    store: Option<PathBuf>,
    color: Option<ColorMode>,
) -> Result<(), LaptrackError> {
    let store = open_store(config, store)?;
    let summary_rows = store
        .load_grouped(Collection::Summary)?
        .records()
        .cloned()
        .collect();
    let detailed = store.load_grouped(Collection::Detailed)?;
    let mut colors = color.unwrap_or(config.color_mode).source();
    let dashboard = Dashboard::build(
        summary_rows,
        &detailed,
        config.dashboard_settings(),
        colors.as_mut(),
        &Local,
    );
    print_json(&dashboard)
}

fn update_config(mut config: AppConfig, update: ConfigUpdate) -> Result<(), LaptrackError> {
    if !update.is_empty() {
        config.apply(update);
        config.save()?;
        info!("Saved config to {:?}", AppConfig::config_path());
    }
    print_json(&config)
}

fn main() -> ExitCode {
    colog::init();

    let cli = Args::parse();
    let config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            AppConfig::default()
        }
    };

    let result = match cli.command {
        Commands::Import { input, mode, store } => import(&config, input, mode, store),
        Commands::Series { store, color } => series(&config, store, color),
        Commands::Summary { store } => summary(&config, store),
        Commands::Dashboard { store, color } => dashboard(&config, store, color),
        Commands::Config {
            store_dir,
            color,
            min_valid_lap_distance,
            sample_interval,
        } => update_config(
            config,
            ConfigUpdate {
                store_dir,
                color_mode: color,
                min_valid_lap_distance_m: min_valid_lap_distance,
                detailed_sample_interval: sample_interval,
            },
        ),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

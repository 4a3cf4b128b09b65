use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_dash::api::{build_router, state::AppState, with_layers};
use league_dash::calculate::{
    chip_summary_view, chip_timeline_view, cup_view, prize_fund_view, prize_ledger_view,
    weekly_winner_view, LeagueSettings,
};
use league_dash::config::AppConfig;
use league_dash::fetch::{FplClient, FplClientConfig};
use league_dash::snapshot::{Snapshot, SnapshotCache};
use league_dash::storage::StorageConfig;
use league_dash::sync::{SyncConfig, SyncOrchestrator};

#[derive(Parser)]
#[command(name = "league-dash")]
#[command(about = "Fantasy football league winners, chips and cup tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch scores, chips and season progress from the fantasy API
    Sync {
        /// Fetch but don't store
        #[arg(long)]
        dry_run: bool,

        /// League to sync (overrides the config file)
        #[arg(long)]
        league_id: Option<u64>,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Print one view as JSON
    Report {
        #[arg(value_enum)]
        view: ReportView,

        /// Manager to highlight
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportView {
    Tables,
    Managers,
    WeeklyWinners,
    Prizes,
    Chips,
    ChipTimeline,
    Cup,
    PrizeFund,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(
    snapshot: &Snapshot,
    settings: &LeagueSettings,
    view: ReportView,
    user: Option<&str>,
) -> Result<()> {
    match view {
        ReportView::Tables => print_json(&snapshot.table_statuses()),
        ReportView::Managers => print_json(&snapshot.managers()),
        ReportView::WeeklyWinners => print_json(&weekly_winner_view(snapshot, settings, user)),
        ReportView::Prizes => print_json(&prize_ledger_view(snapshot, settings, user)),
        ReportView::Chips => print_json(&chip_summary_view(snapshot, settings, user)),
        ReportView::ChipTimeline => print_json(&chip_timeline_view(snapshot)),
        ReportView::Cup => print_json(&cup_view(snapshot)),
        ReportView::PrizeFund => print_json(&prize_fund_view(snapshot)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting league-dash v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let settings = LeagueSettings::from(&config.league);

    match cli.command {
        Commands::Sync { dry_run, league_id } => {
            let mut sync_config = SyncConfig::from_app_config(&config);
            sync_config.dry_run = dry_run;
            if let Some(id) = league_id {
                sync_config.league_id = id;
            }

            let client = FplClient::new(FplClientConfig::from_config(&config.fetch)?)?;
            let orchestrator = SyncOrchestrator::new(sync_config, Arc::new(client));

            match orchestrator.sync_once().await {
                Ok(result) => {
                    println!("\n=== Sync Results ===");
                    println!("Managers:         {}", result.managers);
                    println!("Score rows:       {}", result.score_rows);
                    println!("Chip rows:        {}", result.chip_rows);
                    match result.current_event {
                        Some(gw) => println!("Current gameweek: {}", gw),
                        None => println!("Current gameweek: none"),
                    }
                    println!("Finished:         {}", result.finished_events);
                    println!("Duration:         {:?}", result.duration);
                    if !result.written {
                        println!("\n(dry run - no data written to disk)");
                    }
                }
                Err(e) => {
                    tracing::error!("Sync failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let cache = SnapshotCache::new(storage, config.league.cache_ttl());
            cache.reload();
            let state = AppState::new(cache, settings);

            let app = with_layers(build_router(state), &config.server, access_log);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}/api", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Report { view, user } => {
            let snapshot = Snapshot::load(&storage);
            report(&snapshot, &settings, view, user.as_deref())?;
        }
    }

    Ok(())
}

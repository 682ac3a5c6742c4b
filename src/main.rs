use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use team_betting::api::state::AppState;
use team_betting::api::{build_router, cors_layer};
use team_betting::config::AppConfig;
use team_betting::models::{Bet, Better, Competition, CompetitionId, Competitor};
use team_betting::storage::{BettingStore, StorageConfig};

#[derive(Parser)]
#[command(name = "team-betting")]
#[command(about = "Team betting pools with live bet broadcasts and competition metrics")]
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
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print metrics for a competition as JSON
    Metrics {
        /// Competition ID
        #[arg(long)]
        competition: u64,
    },

    /// Fill an empty data directory with demo data
    Seed,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn open_store(config: &AppConfig) -> Result<BettingStore> {
    BettingStore::open(
        StorageConfig::new(config.data_dir.clone()),
        config.betting.default_max_score,
    )
    .with_context(|| format!("Failed to open data directory {:?}", config.data_dir))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

fn seed(store: &mut BettingStore) -> Result<()> {
    if !store.list_betters().is_empty() || !store.list_competitions().is_empty() {
        tracing::warn!("Data directory is not empty, skipping seed");
        return Ok(());
    }

    let testy = store.add_better(Better::new(
        "Testy Testsson".to_string(),
        "testy@testsson.se".to_string(),
    ))?;
    store.add_better(Better::new(
        "Another Tester".to_string(),
        "testy@anotherone.se".to_string(),
    ))?;

    let mut contest = Competition::new("Eurovision Song Contest 2020".to_string())
        .with_description("Rotterdam".to_string());
    contest.created_by = Some(testy.id);
    let contest = store.add_competition(contest)?;

    let sweden = store.add_competitor(
        Competitor::new("Sweden - Swedish song".to_string()),
        Some(contest.id),
    )?;
    store.add_competitor(
        Competitor::new("Norway - Norwegian song".to_string()),
        Some(contest.id),
    )?;

    store.add_bet(
        Bet::new(testy.id, contest.id, sweden.id)
            .with_score(6)
            .with_note("Catchy chorus"),
    )?;

    tracing::info!("Seeded competition {} ({})", contest.id, contest.name);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);

    tracing::info!("Starting team-betting v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let store = open_store(&config)?;
            let state = AppState::new(store, config.betting.broadcast_capacity);
            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Commands::Metrics { competition } => {
            let store = open_store(&config)?;
            let metrics = store.competition_metrics(CompetitionId::new(competition))?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::Seed => {
            let mut store = open_store(&config)?;
            seed(&mut store)?;
        }
    }

    Ok(())
}

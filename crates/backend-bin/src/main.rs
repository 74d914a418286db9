use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use backend_lib::{
    config::{Settings, StorageBackend},
    create_router,
    storage::{FlatFileStorage, MemoryStore, Storage},
    AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// How often expired sessions and rate-limit windows are swept
const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Parser, Debug)]
#[command(name = "fintrack-server", version, about = "Personal finance tracker server")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

fn init_tracing(settings: &Settings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Settings::load()?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings);

    match settings.storage {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            serve(MemoryStore::new(), settings).await
        },
        StorageBackend::FlatFile => {
            let storage = FlatFileStorage::new(&settings.data_dir)
                .with_context(|| format!("opening data dir {}", settings.data_dir.display()))?;
            serve(storage, settings).await
        },
    }
}

async fn serve<S: Storage>(storage: S, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(storage, settings)?);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sweep_expired();
        }
    });

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

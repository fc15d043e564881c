use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliodesk::config::Config;
use bibliodesk::infrastructure::{AppState, HttpCatalogClient};
use bibliodesk::services::{BorrowLedger, LendingDesk, run_reminder_loop};
use bibliodesk::{server, store};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliodesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let mut config = Config::from_env();

    // --profile on the command line wins over PROFILE
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--profile")
        && let Some(val) = args.get(pos + 1)
    {
        config = Config::from_lookup(|key| {
            if key == "PROFILE" {
                Some(val.clone())
            } else {
                std::env::var(key).ok()
            }
        });
    }

    if let Err(e) = run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), String> {
    let store = store::open_store(&config.store_dir).map_err(|e| e.to_string())?;
    let ledger =
        BorrowLedger::open(store, config.ledger_key.clone()).map_err(|e| e.to_string())?;

    let remote = HttpCatalogClient::new(&config.catalog_url, config.remote_timeout)
        .map_err(|e| e.to_string())?;
    tracing::info!("Catalog service at {}", remote.base_url());

    let mut desk = LendingDesk::new(ledger, Arc::new(remote));

    // The page still works from history alone if the catalog is down
    if let Err(e) = desk.refresh_catalog().await {
        tracing::warn!("Starting without a catalog: {}", e);
    }

    let state = AppState::new(desk);

    let reminder_state = state.clone();
    let period = config.reminder_interval;
    tokio::spawn(async move {
        run_reminder_loop(reminder_state, period).await;
    });

    server::serve(state, &config).await
}

//! Automation Hub: workflow marketplace back-end.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the request store, starts the HTTP API, and runs a housekeeping
//! loop with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use automation_hub::catalog::WorkflowCatalog;
use automation_hub::config;
use automation_hub::dashboard::{self, HubState};
use automation_hub::storage::LocalStore;

const BANNER: &str = r#"
    _         _                        _   _               _   _       _
   / \  _   _| |_ ___  _ __ ___   __ _| |_(_) ___  _ __   | | | |_   _| |__
  / _ \| | | | __/ _ \| '_ ` _ \ / _` | __| |/ _ \| '_ \  | |_| | | | | '_ \
 / ___ \ |_| | || (_) | | | | | | (_| | |_| | (_) | | | | |  _  | |_| | |_) |
/_/   \_\__,_|\__\___/|_| |_| |_|\__,_|\__|_|\___/|_| |_| |_| |_|\__,_|_.__/

  Pre-built n8n workflows, ready to deploy
"#;

/// How often expired sessions and idle visitors are purged.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(300);

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let loaded = config::AppConfig::load_optional(CONFIG_PATH)?;

    init_logging();

    let cfg = match loaded {
        Some(cfg) => cfg,
        None => {
            warn!(path = CONFIG_PATH, "Config file not found, using defaults");
            config::AppConfig::default()
        }
    };

    println!("{BANNER}");
    info!(
        name = %cfg.hub.name,
        store = %cfg.hub.store_path,
        port = cfg.dashboard.port,
        "Automation Hub starting up"
    );

    // -- Build state -----------------------------------------------------

    let catalog = match &cfg.hub.workflows_path {
        Some(path) => WorkflowCatalog::load(path)?,
        None => WorkflowCatalog::builtin()?,
    };
    let store = LocalStore::open(&cfg.hub.store_path)?;
    let state = Arc::new(HubState::new(&cfg, catalog, store)?);

    let pending_requests = state.requests.read().await.pending_count()?;
    info!(
        workflows = state.catalog.len(),
        featured = state.featured.len(),
        integrations = state.integrations.all().len(),
        pending_requests,
        "State ready"
    );

    let server = if cfg.dashboard.enabled {
        Some(dashboard::spawn_dashboard(state.clone(), cfg.dashboard.port).await?)
    } else {
        warn!("Dashboard disabled; nothing will be served");
        None
    };

    // -- Main loop -------------------------------------------------------

    let mut housekeeping = tokio::time::interval(HOUSEKEEPING_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Entering main loop. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = housekeeping.tick() => {
                let purged = state.sessions.write().await.purge_expired();
                if purged > 0 {
                    info!(purged, "Expired sessions removed");
                }
                let (viewers, chats) = state.purge_idle_clients().await;
                if viewers + chats > 0 {
                    info!(viewers, chats, "Idle visitors removed");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    // -- Shutdown --------------------------------------------------------

    if let Some(server) = server {
        server.abort();
        let _ = server.await;
    }

    if let Err(e) = state.requests.read().await.store().save() {
        error!(error = %e, "Failed to save store");
    }

    state.shutdown_clients().await;

    info!("Automation Hub shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("automation_hub=info"));

    let json_logging = std::env::var("HUB_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

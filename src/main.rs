use deskbook::api::build_router;
use deskbook::bootstrap;
use deskbook::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskbook=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");
    if !config.payments_enabled() {
        tracing::warn!("Payments not configured; checkout will report payments as disabled");
    }

    let addr: SocketAddr = config.server_address().parse()?;

    // Build application state (clients, catalog, flow sessions)
    let state = bootstrap::build_app_state(config).await?;

    // Build router
    let app = build_router(state);

    // Start server
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

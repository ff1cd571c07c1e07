use anyhow::Context;
use lead_engine::{server, Config, Hunter};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Lead Engine - ingatlan.com listing watcher");

    let config = Config::from_env().context("Failed to load configuration")?;
    let hunter = Hunter::from_config(&config).await?;

    // `lead-engine once` runs a single hunt, for plain cron use
    if std::env::args().nth(1).as_deref() == Some("once") {
        let response = hunter.run().await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.is_ok() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let app = server::router(Arc::new(hunter));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!("Listening on {}", config.bind_addr);
    info!("Trigger a hunt with GET /api/hunt");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

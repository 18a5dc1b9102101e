use std::sync::Arc;

use anyhow::Context;

use storefront_infra::{InventoryConfig, InventoryContext, runners};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = InventoryConfig::from_env();
    tracing::info!(
        reservation_ttl_secs = config.reservation_ttl.as_secs(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "starting storefront inventory"
    );

    let ctx = Arc::new(InventoryContext::from_config(&config)?);
    let handles = runners::spawn_all(&ctx, &config).context("failed to start background runners")?;

    let app = storefront_api::app::build_app(ctx.clone()).context("failed to build router")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for handle in handles {
        let name = handle.name();
        handle.shutdown();
        tracing::info!(runner = name, "runner stopped");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

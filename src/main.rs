use anyhow::Context;
use sepal_gateway::api::GatewayServer;
use sepal_gateway::config::AppConfig;
use sepal_gateway::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    sepal_gateway::init_tracing();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let state = AppState::new(config);

    let mut server = GatewayServer::new(state);
    server.start().await.context("Failed to start gateway")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");
    server.stop();

    Ok(())
}

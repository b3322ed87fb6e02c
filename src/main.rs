use std::sync::Arc;

use anyhow::{Context, Result};
use invest_ledger::{
    config::Config,
    db::Database,
    server::{Server, Services},
};
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Arc::new(Config::from_env().context("Failed to load config")?);
    let database = Database::connect(&config.database_url)
        .await
        .context("Failed to create DB pool")?;
    log::info!("Connected to datastore");

    let services = Arc::new(Services::new(database.pool, Arc::clone(&config)));
    let server = Server::new(services, &config.bind_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    server.start(shutdown_rx).await
}

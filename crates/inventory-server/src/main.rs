//! Inventory Server Binary
//!
//! Standalone server for the inventory session API.

use std::sync::Arc;

use inventory_core::InventoryConfig;
use inventory_server::{serve, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = InventoryConfig::load_standard()?;
    if let Ok(addr) = std::env::var("INVENTORY_ADDR") {
        config.server.addr = addr;
    }
    config.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = config.server.addr.clone();
    let state = Arc::new(AppState::from_config(config)?);

    serve(&addr, state).await
}

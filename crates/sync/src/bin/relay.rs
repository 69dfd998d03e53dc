//! arstage sync relay
//!
//! Binds `ARSTAGE_RELAY_ADDR` (default 127.0.0.1:9001). Log level follows
//! `RUST_LOG`.

use arstage_sync::{Relay, SyncError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = arstage_config::relay_addr_from_env();
    let relay = Relay::bind(&addr).await?;
    relay.run().await
}

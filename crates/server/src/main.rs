//! DendroScan Server - HTTP API for plant species and defect classification
//!
//! Loads `.env`, `server.*` and `DENDRO_SERVER__*` settings, builds the
//! prediction pipeline and serves it.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}

//! DendroScan Server - HTTP API for plant species and defect classification
//!
//! This crate exposes the DendroScan pipeline over HTTP. A photo goes in,
//! every detected plant comes back with its species, type and defects, plus
//! links to the uploaded crops and the framed photo.
//!
//! # Features
//!
//! - **Authentication**: shared `ml-token` header on prediction routes
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `.env`, optional `server` config file, `DENDRO_SERVER__*` variables
//! - **Error Handling**: JSON error bodies with stable error codes
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with pipeline components
//!
//! ## Protected Endpoints (`ml-token` Required)
//!
//! - `POST /scan` - `{url, request_id, user_id}`; fetch the photo from the
//!   public bucket and classify it. Answers `{scan_id, predict}`.
//! - `POST /api/v1/predict` - Raw image body; answers `{plants, framed_url}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AuthSettings, HttpSettings, PipelineSettings, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;

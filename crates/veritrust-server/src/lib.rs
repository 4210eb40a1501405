//! VeriTrust Server
//!
//! HTTP surface for the review classifier:
//! - `GET /health` reports whether the model loaded
//! - `POST /predict` returns a label, a rounded confidence and explainability signals
//! - `GET /metrics` renders Prometheus metrics

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use cli::Cli;
pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;

//! Content-site API gateway.
//!
//! Two mechanisms form the core: per-client fixed-window request admission in
//! front of the API surface, and an image upload pipeline with
//! category-bucketed storage, collision-free naming, and idempotent deletion.

pub mod admission;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod uploads;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

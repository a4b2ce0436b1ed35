//! HTTP Adapter
//!
//! axum router exposing the health check and the wallet valuation endpoint.

mod error;
mod routes;

pub use error::{ApiError, ErrorBody};
pub use routes::{router, AppState, HealthResponse, TokensQuery, HEALTH_STATUS};

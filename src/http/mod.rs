//! HTTP boundary
//!
//! A single fallback route receives every request. CORS, health checks
//! and credential checks happen here; session routing is delegated to
//! `session::LifecycleDispatcher`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use error::BoundaryError;
pub use handlers::{boundary_handler, ping_handler};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(boundary_handler)
        .layer(axum_middleware::from_fn(middleware::log_request))
        .with_state(state)
}

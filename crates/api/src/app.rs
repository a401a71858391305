//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: record store, login accounts and session tokens
//! - `routes/`: HTTP handlers (one file per resource, plus pages and auth)
//! - `dto.rs`: REST request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{graphql, middleware};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let schema = graphql::build_schema(services.records.clone());

    // The index page is the only route behind the login gate.
    let gated = Router::new()
        .route("/", get(routes::pages::index))
        .route_layer(axum::middleware::from_fn(middleware::require_login));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(gated)
        .merge(routes::router())
        .merge(graphql::router())
        .layer(Extension(schema))
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            services,
            middleware::session_middleware,
        ))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

//! HTTP adapters: routers, handlers, and DTOs.

pub mod payments;

use axum::routing::get;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use payments::{health, payments_routes, PaymentsAppState};

/// Build the complete application router.
///
/// The CORS policy mirrors the original deployment: browser clients call these
/// endpoints cross-origin, so any origin may POST with a JSON body.
pub fn app_router(state: PaymentsAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/health", get(health))
        .nest("/api/payments", payments_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

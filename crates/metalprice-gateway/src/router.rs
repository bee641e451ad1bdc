//! Axum router wiring.
//!
//! `/` liveness banner, `/prices` and `/prices/:base`, `/metrics`.
//! CORS allows any origin on every route. Unknown paths and methods answer
//! with the same JSON error body as the handlers.

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{app_state::AppState, transport::http};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", get(http::index).fallback(http::method_not_allowed))
        .route("/prices", get(http::prices_default).fallback(http::method_not_allowed))
        .route("/prices/:base", get(http::prices_for_base).fallback(http::method_not_allowed))
        .route("/metrics", get(http::metrics).fallback(http::method_not_allowed))
        .fallback(http::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

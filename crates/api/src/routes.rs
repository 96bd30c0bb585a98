use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_api_routes(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_request_size);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/KdcProxy", post(handlers::proxy_kdc))
        .route("/KdcProxy/kpasswd", post(handlers::proxy_kpasswd))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::handlers::{
    country_detail, country_uploaders, dashboard_stats, health_check, list_campaigns, AppState,
};

pub fn create_api_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/campaigns", get(list_campaigns))
        .route("/data/{campaign}/{year}/{country}", get(country_detail))
        .route(
            "/data/{campaign}/{year}/{country}/uploaders",
            get(country_uploaders),
        )
        .route("/stats", post(dashboard_stats))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

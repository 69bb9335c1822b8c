use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::catalog::{Campaign, CAMPAIGNS};
use crate::resolve::{
    Coordinate, CountryStatRecord, DailyStat, DirectApiSource, ResolutionEngine, ResolveError,
};
use crate::stats::{self, OverallStats, SizeBucket, UserContribution};
use crate::trend;

pub struct AppState {
    pub engine: ResolutionEngine,
    pub uploaders: DirectApiSource,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Everything the statistics dashboard renders for one raw result set.
#[derive(Serialize)]
pub struct DashboardStats {
    pub daily_uploads: Vec<DailyStat>,
    pub user_contributions: Vec<UserContribution>,
    pub file_size_distribution: Vec<SizeBucket>,
    pub overall: OverallStats,
    /// SVG polyline `points` attribute for the daily-uploads sparkline.
    pub trend_points: String,
}

fn resolve_error_response(err: ResolveError) -> (StatusCode, Json<ErrorResponse>) {
    // NotFound means some tier answered and the coordinate is absent; the
    // rest means no source was reachable or intelligible.
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Resolve one country-year record through the tier chain
pub async fn country_detail(
    State(state): State<Arc<AppState>>,
    Path((campaign, year, country)): Path<(String, i32, String)>,
) -> Result<Json<CountryStatRecord>, (StatusCode, Json<ErrorResponse>)> {
    state
        .engine
        .resolve(&campaign, year, &country)
        .await
        .map(Json)
        .map_err(resolve_error_response)
}

/// Per-country uploaders listing, passed through from the direct endpoint
pub async fn country_uploaders(
    State(state): State<Arc<AppState>>,
    Path((campaign, year, country)): Path<(String, i32, String)>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let coordinate = Coordinate::new(campaign, year, country);
    state
        .uploaders
        .fetch_uploaders(&coordinate)
        .await
        .map(Json)
        .map_err(resolve_error_response)
}

/// Aggregate a raw query-service result set into the dashboard views
pub async fn dashboard_stats(Json(payload): Json<Value>) -> Json<DashboardStats> {
    let records = stats::parse_result_set(&payload);
    let daily = stats::daily_uploads(&records);

    let series: Vec<f64> = daily.iter().map(|day| day.count as f64).collect();
    let trend_points = trend::points_attribute(&trend::build_default_trend_points(&series));

    Json(DashboardStats {
        user_contributions: stats::user_contributions(&records),
        file_size_distribution: stats::file_size_distribution(&records),
        overall: stats::overall_stats(&records),
        daily_uploads: daily,
        trend_points,
    })
}

/// List the known campaigns
pub async fn list_campaigns() -> Json<Vec<Campaign>> {
    Json(CAMPAIGNS.to_vec())
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

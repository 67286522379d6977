//! Routes for the monthly maintenance calendar.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::maintenance::MonthOverviewRow;
use services::services::calendar::{CalendarService, MonthGrid, PublishResult};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn month_grid(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<ResponseJson<ApiResponse<MonthGrid>>, ApiError> {
    let grid = CalendarService::new(state.db.pool.clone())
        .month_grid(year, month)
        .await?;
    Ok(ResponseJson(ApiResponse::success(grid)))
}

/// Schedule the month: one visit per active elevator without one yet.
pub async fn publish_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<ResponseJson<ApiResponse<PublishResult>>, ApiError> {
    let result = CalendarService::new(state.db.pool.clone())
        .publish_month(year, month)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub async fn month_overview(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<ResponseJson<ApiResponse<Vec<MonthOverviewRow>>>, ApiError> {
    let rows = CalendarService::new(state.db.pool.clone())
        .month_overview(year, month)
        .await?;
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/{year}/{month}", get(month_grid))
        .route("/calendar/{year}/{month}/publish", post(publish_month))
        .route("/calendar/{year}/{month}/overview", get(month_overview))
}

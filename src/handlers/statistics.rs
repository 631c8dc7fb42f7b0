use crate::schemas::{ApiResponse, AppState, CategoryQuery, StatisticsQuery};
use crate::stores::{CategoryShare, PlanProgress, SummaryView};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::instrument;

/// Minute totals per kind with the calorie estimate. Defaults to all
/// time; pass `period=` or explicit dates to narrow.
#[utoipa::path(
    get,
    path = "/api/v1/statistics/summary",
    tag = "statistics",
    responses(
        (status = 200, description = "Summary retrieved successfully", body = ApiResponse<SummaryView>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_summary(
    Query(query): Query<StatisticsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SummaryView>>, StatusCode> {
    let summary = state.entries.summary(query.resolve()).await;
    Ok(Json(ApiResponse {
        data: summary,
        message: "Summary retrieved successfully".to_string(),
        success: true,
    }))
}

/// Category totals with distribution percentages for one entry kind
#[utoipa::path(
    get,
    path = "/api/v1/statistics/categories",
    tag = "statistics",
    responses(
        (status = 200, description = "Breakdown retrieved successfully", body = ApiResponse<Vec<CategoryShare>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category_breakdown(
    Query(query): Query<CategoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryShare>>>, StatusCode> {
    let range = query.resolve();
    let breakdown = state.entries.category_breakdown(query.kind, range).await;
    Ok(Json(ApiResponse {
        message: format!("Retrieved {} categories", breakdown.len()),
        data: breakdown,
        success: true,
    }))
}

/// Weekly completion rate per plan
#[utoipa::path(
    get,
    path = "/api/v1/statistics/progress",
    tag = "statistics",
    responses(
        (status = 200, description = "Progress retrieved successfully", body = ApiResponse<Vec<PlanProgress>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_progress(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PlanProgress>>>, StatusCode> {
    let progress = state.plans.progress().await;
    Ok(Json(ApiResponse {
        message: format!("Retrieved progress for {} plans", progress.len()),
        data: progress,
        success: true,
    }))
}

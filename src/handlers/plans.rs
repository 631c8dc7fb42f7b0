use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDateTime;
use common::LooseNumber;
use model::plan;
use serde::{Deserialize, Serialize};
use store::{NewPlan, PlanPatch};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

const DEFAULT_PLAN_ICON: &str = "target";
const DEFAULT_PLAN_COLOR: &str = "#60A5FA";

/// Request body for creating a plan
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreatePlanRequest {
    /// Display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Weekly target in minutes; numeric strings are accepted
    pub balance: LooseNumber,
    /// Display icon
    pub icon: Option<String>,
    /// Display color
    pub color: Option<String>,
}

/// Request body for updating a plan
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdatePlanRequest {
    /// Display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    /// Weekly target in minutes; numeric strings are accepted
    pub balance: Option<LooseNumber>,
    /// Display icon
    pub icon: Option<String>,
    /// Display color
    pub color: Option<String>,
}

/// Plan response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub name: String,
    /// Weekly target in minutes
    pub balance: f64,
    pub icon: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

impl From<plan::Model> for PlanResponse {
    fn from(model: plan::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            balance: model.balance,
            icon: model.icon,
            color: model.color,
            created_at: model.created_at,
        }
    }
}

/// Sum of all weekly targets
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalBalanceResponse {
    pub total: f64,
}

/// Create a new plan
#[utoipa::path(
    post,
    path = "/api/v1/plans",
    tag = "plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created successfully", body = ApiResponse<PlanResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_plan(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreatePlanRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PlanResponse>>), StatusCode> {
    let new_plan = NewPlan {
        name: request.name,
        balance: request.balance,
        icon: request.icon.unwrap_or_else(|| DEFAULT_PLAN_ICON.to_string()),
        color: request.color.unwrap_or_else(|| DEFAULT_PLAN_COLOR.to_string()),
    };

    match state.plans.add_plan(new_plan).await {
        Ok(created) => {
            info!(id = created.id, "plan created");
            let response = ApiResponse {
                data: PlanResponse::from(created),
                message: "Plan created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            error!("Failed to create plan: {}", err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all plans, newest first
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    tag = "plans",
    responses(
        (status = 200, description = "Plans retrieved successfully", body = ApiResponse<Vec<PlanResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_plans(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PlanResponse>>>, StatusCode> {
    state.plans.refresh().await;
    let snapshot = state.plans.snapshot().await;
    if let Some(err) = &snapshot.last_error {
        warn!("plan snapshot carries an error: {}", err);
    }

    let plans: Vec<PlanResponse> = snapshot.plans.into_iter().map(PlanResponse::from).collect();
    Ok(Json(ApiResponse {
        message: format!("Retrieved {} plans", plans.len()),
        data: plans,
        success: true,
    }))
}

/// Get a specific plan by ID
#[utoipa::path(
    get,
    path = "/api/v1/plans/{plan_id}",
    tag = "plans",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    responses(
        (status = 200, description = "Plan retrieved successfully", body = ApiResponse<PlanResponse>),
        (status = 404, description = "Plan not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_plan(
    Path(plan_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PlanResponse>>, StatusCode> {
    match state.plans.plan(plan_id).await {
        Ok(Some(plan)) => Ok(Json(ApiResponse {
            data: PlanResponse::from(plan),
            message: "Plan retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("plan {} not found", plan_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(err) => {
            error!("Failed to retrieve plan {}: {}", plan_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a plan. Edits stay local; the mirror only sees plans again at
/// the next bulk replay.
#[utoipa::path(
    put,
    path = "/api/v1/plans/{plan_id}",
    tag = "plans",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Plan updated successfully", body = ApiResponse<PlanResponse>),
        (status = 404, description = "Plan not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_plan(
    Path(plan_id): Path<i64>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdatePlanRequest>>,
) -> Result<Json<ApiResponse<PlanResponse>>, StatusCode> {
    let patch = PlanPatch {
        name: request.name,
        balance: request.balance,
        icon: request.icon,
        color: request.color,
    };

    if let Err(err) = state.plans.update_plan(plan_id, patch).await {
        error!("Failed to update plan {}: {}", plan_id, err);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match state.plans.plan(plan_id).await {
        Ok(Some(plan)) => Ok(Json(ApiResponse {
            data: PlanResponse::from(plan),
            message: "Plan updated successfully".to_string(),
            success: true,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Failed to reload plan {}: {}", plan_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a plan; its entries are removed by the local cascade. The
/// remote mirror keeps whatever was already pushed.
#[utoipa::path(
    delete,
    path = "/api/v1/plans/{plan_id}",
    tag = "plans",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    responses(
        (status = 200, description = "Plan deleted successfully", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_plan(
    Path(plan_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    match state.plans.remove_plan(plan_id).await {
        Ok(()) => Ok(Json(ApiResponse {
            data: plan_id.to_string(),
            message: "Plan deleted successfully".to_string(),
            success: true,
        })),
        Err(err) => {
            error!("Failed to delete plan {}: {}", plan_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Sum of all plans' weekly targets
#[utoipa::path(
    get,
    path = "/api/v1/plans/balance",
    tag = "plans",
    responses(
        (status = 200, description = "Total retrieved successfully", body = ApiResponse<TotalBalanceResponse>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_total_balance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TotalBalanceResponse>>, StatusCode> {
    state.plans.refresh().await;
    let snapshot = state.plans.snapshot().await;
    Ok(Json(ApiResponse {
        data: TotalBalanceResponse {
            total: snapshot.total_balance,
        },
        message: "Total retrieved successfully".to_string(),
        success: true,
    }))
}

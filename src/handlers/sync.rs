use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use common::ReplayReport;
use tracing::{error, info, instrument, warn};

/// Manually replay every local plan and entry to the remote mirror.
/// Requires a signed-in session, like the original sync screens.
#[utoipa::path(
    post,
    path = "/api/v1/sync/replay",
    tag = "sync",
    responses(
        (status = 200, description = "Replay finished", body = ApiResponse<ReplayReport>),
        (status = 401, description = "Not signed in", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn replay(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReplayReport>>, StatusCode> {
    if !state.session.is_signed_in().await {
        warn!("replay requested without a session");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let (plans_ok, plans_failed) = match state.plans.replay().await {
        Ok(counts) => counts,
        Err(err) => {
            error!("plan replay aborted: {}", err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let (entries_ok, entries_failed) = match state.entries.replay().await {
        Ok(counts) => counts,
        Err(err) => {
            error!("entry replay aborted: {}", err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let report = ReplayReport {
        plans_ok,
        plans_failed,
        entries_ok,
        entries_failed,
    };
    info!(?report, "manual replay finished");

    Ok(Json(ApiResponse {
        data: report,
        message: "Replay finished".to_string(),
        success: true,
    }))
}

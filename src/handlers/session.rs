use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::ReplayReport;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for signing in
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    /// Display name; defaults to the email's local part
    pub name: Option<String>,
}

/// Session response with the bulk-replay outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub email: String,
    pub name: String,
    /// Counts from the post-sign-in bulk replay
    pub replay: ReplayReport,
}

/// Current session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentSessionResponse {
    pub email: Option<String>,
    pub name: Option<String>,
    pub signed_in: bool,
}

/// Sign in. On success the user record is mirrored and every local plan
/// and entry is replayed to the remote, sequentially; partial failure is
/// reported in the counts and the sign-in still succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    tag = "session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn sign_in(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<SignInRequest>>,
) -> Result<Json<ApiResponse<SessionResponse>>, StatusCode> {
    let name = request
        .name
        .unwrap_or_else(|| request.email.split('@').next().unwrap_or_default().to_string());

    state.session.sign_in(request.email.clone(), name.clone()).await;
    info!(email = %request.email, "signed in");

    // Best-effort: the user mirror and the replay may partially fail
    // without affecting the session.
    state.sync.user_signed_in(&request.email, &name).await;

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

    let replay = ReplayReport {
        plans_ok,
        plans_failed,
        entries_ok,
        entries_failed,
    };
    info!(?replay, "post-sign-in replay finished");

    Ok(Json(ApiResponse {
        data: SessionResponse {
            email: request.email,
            name,
            replay,
        },
        message: "Signed in successfully".to_string(),
        success: true,
    }))
}

/// Current session state
#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "session",
    responses(
        (status = 200, description = "Session state", body = ApiResponse<CurrentSessionResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
) -> Json<ApiResponse<CurrentSessionResponse>> {
    let current = state.session.current().await;
    let signed_in = current.is_some();
    let (email, name) = match current {
        Some(user) => (Some(user.email), Some(user.name)),
        None => (None, None),
    };
    Json(ApiResponse {
        data: CurrentSessionResponse {
            email,
            name,
            signed_in,
        },
        message: "Session state retrieved".to_string(),
        success: true,
    })
}

/// Sign out. Local-only: nothing is withdrawn from the mirror.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    tag = "session",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn sign_out(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    state.session.sign_out().await;
    Json(ApiResponse {
        data: "signed_out".to_string(),
        message: "Signed out successfully".to_string(),
        success: true,
    })
}

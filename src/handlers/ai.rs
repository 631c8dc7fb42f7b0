use crate::coach::{self, AdviceType, DayPart, RecentWorkout};
use crate::recognition::{self, InputKind, Recognition};
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recognizing a workout from text
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RecognizeRequest {
    /// Free-form text (or a voice transcript / image description)
    #[validate(length(min = 1, message = "input must not be empty"))]
    pub input: String,
    #[serde(default)]
    pub input_type: InputKind,
}

/// Context the coach can use; omitted pieces are filled from local state
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CoachContext {
    pub recent_workouts: Option<Vec<RecentWorkout>>,
    pub current_time: Option<DateTime<Utc>>,
}

/// Request body for coaching advice
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CoachRequest {
    pub advice_type: AdviceType,
    pub context: Option<CoachContext>,
}

/// Coaching advice response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CoachResponse {
    pub advice: String,
}

/// Recognize an entry draft from free-form input. The configured AI
/// upstream is tried first; the keyword rules always answer otherwise.
#[utoipa::path(
    post,
    path = "/api/ai/recognize",
    tag = "ai",
    request_body = RecognizeRequest,
    responses(
        (status = 200, description = "Recognition result", body = ApiResponse<Recognition>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn recognize(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RecognizeRequest>>,
) -> Result<Json<ApiResponse<Recognition>>, StatusCode> {
    let result =
        recognition::recognize(&state.http, &state.ai, &request.input, request.input_type).await;
    Ok(Json(ApiResponse {
        data: result,
        message: "Recognition finished".to_string(),
        success: true,
    }))
}

/// Coaching advice for the current time of day
#[utoipa::path(
    post,
    path = "/api/ai/coach",
    tag = "ai",
    request_body = CoachRequest,
    responses(
        (status = 200, description = "Advice", body = ApiResponse<CoachResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn coach(
    State(state): State<AppState>,
    Json(request): Json<CoachRequest>,
) -> Result<Json<ApiResponse<CoachResponse>>, StatusCode> {
    let context = request.context.unwrap_or_default();
    let part = DayPart::from_time(context.current_time);

    // Recent workouts default to the local store's latest records.
    let recent = match context.recent_workouts {
        Some(recent) => recent,
        None => state
            .entries
            .snapshot()
            .await
            .recent
            .into_iter()
            .map(|e| RecentWorkout {
                category: e.category,
                amount: e.amount,
                description: Some(e.description),
            })
            .collect(),
    };

    let advice = coach::advise(
        &state.http,
        &state.ai,
        &state.advice_cache,
        request.advice_type,
        part,
        &recent,
    )
    .await;

    Ok(Json(ApiResponse {
        data: CoachResponse { advice },
        message: "Advice generated".to_string(),
        success: true,
    }))
}

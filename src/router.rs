use crate::handlers::{
    ai::{coach, recognize},
    entries::{create_entry, delete_entry, get_entries, get_entry, update_entry},
    health::health_check,
    plans::{create_plan, delete_plan, get_plan, get_plans, get_total_balance, update_plan},
    session::{get_session, sign_in, sign_out},
    statistics::{get_category_breakdown, get_progress, get_summary},
    sync::replay,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Plan CRUD routes
        .route("/api/v1/plans", post(create_plan))
        .route("/api/v1/plans", get(get_plans))
        .route("/api/v1/plans/balance", get(get_total_balance))
        .route("/api/v1/plans/:plan_id", get(get_plan))
        .route("/api/v1/plans/:plan_id", put(update_plan))
        .route("/api/v1/plans/:plan_id", delete(delete_plan))
        // Entry CRUD routes
        .route("/api/v1/entries", post(create_entry))
        .route("/api/v1/entries", get(get_entries))
        .route("/api/v1/entries/:entry_id", get(get_entry))
        .route("/api/v1/entries/:entry_id", put(update_entry))
        .route("/api/v1/entries/:entry_id", delete(delete_entry))
        // Statistics routes
        .route("/api/v1/statistics/summary", get(get_summary))
        .route("/api/v1/statistics/categories", get(get_category_breakdown))
        .route("/api/v1/statistics/progress", get(get_progress))
        // Session and sync routes
        .route("/api/v1/session", post(sign_in))
        .route("/api/v1/session", get(get_session))
        .route("/api/v1/session", delete(sign_out))
        .route("/api/v1/sync/replay", post(replay))
        // AI routes
        .route("/api/ai/recognize", post(recognize))
        .route("/api/ai/coach", post(coach))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

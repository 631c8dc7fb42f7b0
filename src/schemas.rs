use std::sync::Arc;

use chrono::NaiveDate;
use common::{DateRange, Period, ReplayReport};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::coach::RecentWorkout;
use crate::config::AiConfig;
use crate::recognition::Recognition;
use crate::session::Session;
use crate::stores::{CategoryShare, EntryStore, PlanProgress, PlanStore, SummaryView};
use crate::sync::SyncService;

/// Application state shared across handlers. Built once at startup by
/// `config::initialize_app_state`; tests build their own and tear it
/// down through the stores' reset hooks.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection (the local source of truth).
    pub db: DatabaseConnection,
    /// Plan view-model store.
    pub plans: Arc<PlanStore>,
    /// Entry view-model store.
    pub entries: Arc<EntryStore>,
    /// Signed-in session state.
    pub session: Arc<Session>,
    /// Sync orchestrator for the remote mirror.
    pub sync: Arc<SyncService>,
    /// Optional AI upstream configuration.
    pub ai: AiConfig,
    /// HTTP client for the AI upstream.
    pub http: reqwest::Client,
    /// Cache for coach advice, keyed by advice type and time bucket.
    pub advice_cache: Cache<String, String>,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Query parameters for the statistics endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatisticsQuery {
    /// Named calendar period (week/month/year) around today
    pub period: Option<Period>,
    /// Start date for a custom range (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// End date for a custom range (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl StatisticsQuery {
    /// Explicit dates win over a named period; neither means all time.
    pub fn resolve(&self) -> Option<DateRange> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            Some(DateRange::new(start, end))
        } else {
            self.period
                .map(|p| p.range(chrono::Utc::now().date_naive()))
        }
    }
}

/// Query parameters for the category breakdown endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryQuery {
    /// Entry kind whose vocabulary to aggregate (income/expense)
    pub kind: model::entities::entry::EntryKind,
    /// Named calendar period (week/month/year) around today
    pub period: Option<Period>,
    /// Start date for a custom range (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// End date for a custom range (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl CategoryQuery {
    pub fn resolve(&self) -> Option<DateRange> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            Some(DateRange::new(start, end))
        } else {
            self.period
                .map(|p| p.range(chrono::Utc::now().date_naive()))
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::plans::create_plan,
        crate::handlers::plans::get_plans,
        crate::handlers::plans::get_plan,
        crate::handlers::plans::update_plan,
        crate::handlers::plans::delete_plan,
        crate::handlers::plans::get_total_balance,
        crate::handlers::entries::create_entry,
        crate::handlers::entries::get_entries,
        crate::handlers::entries::get_entry,
        crate::handlers::entries::update_entry,
        crate::handlers::entries::delete_entry,
        crate::handlers::statistics::get_summary,
        crate::handlers::statistics::get_category_breakdown,
        crate::handlers::statistics::get_progress,
        crate::handlers::session::sign_in,
        crate::handlers::session::get_session,
        crate::handlers::session::sign_out,
        crate::handlers::sync::replay,
        crate::handlers::ai::recognize,
        crate::handlers::ai::coach,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::plans::PlanResponse>,
            ApiResponse<Vec<crate::handlers::plans::PlanResponse>>,
            ApiResponse<crate::handlers::entries::EntryResponse>,
            ApiResponse<Vec<crate::handlers::entries::EntryResponse>>,
            ApiResponse<SummaryView>,
            ApiResponse<Vec<CategoryShare>>,
            ApiResponse<Vec<PlanProgress>>,
            ApiResponse<ReplayReport>,
            ApiResponse<Recognition>,
            ErrorResponse,
            StatisticsQuery,
            CategoryQuery,
            SummaryView,
            CategoryShare,
            PlanProgress,
            ReplayReport,
            Recognition,
            RecentWorkout,
            crate::handlers::plans::CreatePlanRequest,
            crate::handlers::plans::UpdatePlanRequest,
            crate::handlers::plans::PlanResponse,
            crate::handlers::plans::TotalBalanceResponse,
            crate::handlers::entries::CreateEntryRequest,
            crate::handlers::entries::UpdateEntryRequest,
            crate::handlers::entries::EntryResponse,
            crate::handlers::session::SignInRequest,
            crate::handlers::session::SessionResponse,
            crate::handlers::session::CurrentSessionResponse,
            crate::handlers::ai::RecognizeRequest,
            crate::handlers::ai::CoachRequest,
            crate::handlers::ai::CoachContext,
            crate::handlers::ai::CoachResponse,
            crate::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "plans", description = "Weekly training plan CRUD"),
        (name = "entries", description = "Logged activity CRUD"),
        (name = "statistics", description = "Summaries and breakdowns"),
        (name = "session", description = "Sign-in state and bulk replay"),
        (name = "sync", description = "Remote mirror operations"),
        (name = "ai", description = "Recognition and coaching"),
    ),
    info(
        title = "Fitlog API",
        description = "Fitness tracking backend with a local-authoritative store and best-effort remote mirroring",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

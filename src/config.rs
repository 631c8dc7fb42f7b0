use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use tracing::info;

use crate::mirror::MirrorClient;
use crate::schemas::AppState;
use crate::session::Session;
use crate::stores::{EntryStore, PlanStore};
use crate::sync::SyncService;

/// Remote mirror endpoint and credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    /// Base URL of the remote tabular service. When empty, every push
    /// fails fast and is logged; local operation is unaffected.
    #[serde(default)]
    pub base_url: String,
    /// API key sent as both the bearer token and the `apikey` header.
    #[serde(default)]
    pub api_key: String,
}

/// Optional OpenAI-compatible upstream used by recognition and coaching.
/// Without credentials the local rule engines answer alone.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: default_ai_model(),
        }
    }
}

/// Application configuration, loaded once at startup. No runtime
/// reconfiguration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_database_url() -> String {
    "sqlite://fitlog.db".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_ai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl AppConfig {
    /// Layered load: built-in defaults, then an optional `fitlog.toml`,
    /// then `FITLOG_*` environment variables (nested keys use `__`, e.g.
    /// `FITLOG_MIRROR__API_KEY`).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let settings = config::Config::builder()
            .add_source(config::File::with_name("fitlog").required(false))
            .add_source(config::Environment::with_prefix("FITLOG").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Connect to the database and wire up the application state: sync
/// service, session, view-model stores and the coach advice cache.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let mirror = MirrorClient::new(&config.mirror);
    let sync = Arc::new(SyncService::new(mirror));
    let session = Arc::new(Session::new());
    let plans = Arc::new(PlanStore::new(db.clone(), sync.clone(), session.clone()));
    let entries = Arc::new(EntryStore::new(db.clone(), sync.clone()));

    let advice_cache = Cache::builder()
        .max_capacity(64)
        .time_to_live(Duration::from_secs(1800))
        .build();

    let state = AppState {
        db,
        plans,
        entries,
        session,
        sync,
        ai: config.ai.clone(),
        http: reqwest::Client::new(),
        advice_cache,
    };

    // Publish initial snapshots so readers never see uninitialized state.
    state.plans.refresh().await;
    state.entries.refresh().await;

    Ok(state)
}

#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{http::StatusCode, routing::post, Router};
    use migration::{Migrator, MigratorTrait};
    use moka::future::Cache;
    use sea_orm::{Database, DatabaseConnection};
    use tokio::net::TcpListener;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use crate::config::{AiConfig, MirrorConfig};
    use crate::mirror::MirrorClient;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::session::Session;
    use crate::stores::{EntryStore, PlanStore};
    use crate::sync::SyncService;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Mirror config pointing at a closed port: every push fails fast,
    /// which is the environment the local-authority tests want.
    pub fn unreachable_mirror() -> MirrorConfig {
        MirrorConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
        }
    }

    /// Create AppState for testing against the given mirror endpoint
    pub async fn setup_test_app_state_with_mirror(mirror: MirrorConfig) -> AppState {
        let db = setup_test_db().await;

        let sync = Arc::new(SyncService::new(MirrorClient::new(&mirror)));
        let session = Arc::new(Session::new());
        let plans = Arc::new(PlanStore::new(db.clone(), sync.clone(), session.clone()));
        let entries = Arc::new(EntryStore::new(db.clone(), sync.clone()));

        let advice_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(60))
            .build();

        AppState {
            db,
            plans,
            entries,
            session,
            sync,
            ai: AiConfig::default(),
            http: reqwest::Client::new(),
            advice_cache,
        }
    }

    /// Create AppState for testing with an unreachable mirror
    pub async fn setup_test_app_state() -> AppState {
        setup_test_app_state_with_mirror(unreachable_mirror()).await
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing (unreachable mirror)
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();
        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Create axum app plus its state for tests that drive both
    pub async fn setup_test_app_with_mirror(mirror: MirrorConfig) -> (Router, AppState) {
        let _ = init_test_tracing();
        let state = setup_test_app_state_with_mirror(mirror).await;
        (create_router(state.clone()), state)
    }

    /// Bind a stub mirror on 127.0.0.1:0 answering every record POST
    /// with `status`; returns its base URL.
    pub async fn spawn_stub_mirror(status: StatusCode) -> String {
        let app = Router::new().route(
            "/api/database/records/:table",
            post(move || async move { (status, "[]") }),
        );
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub mirror");
        let addr = listener.local_addr().expect("stub mirror address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{addr}")
    }
}

//! Remote mirror client: one outbound write per local record to the
//! cloud tabular service. The mirror is strictly best-effort — every
//! failure path collapses into a [`MirrorError`] value, and no local
//! operation may fail because the mirror is unreachable. Whether an
//! error is surfaced or dropped is the orchestration layer's decision.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::MirrorConfig;

/// Largest value the remote service's `integer` columns accept.
const REMOTE_INT_MAX: i64 = i32::MAX as i64;

/// Fold a local 64-bit id into the remote signed 32-bit range.
///
/// Ids at or above `i32::MAX` wrap by modulo and can collide remotely;
/// the remote side cannot tell folded ids apart. This matches the
/// deployed remote schema and is kept as-is rather than corrected here.
pub fn fold_remote_fk(id: i64) -> i64 {
    id % REMOTE_INT_MAX
}

/// Everything that can go wrong pushing one record.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// No base URL configured; mirroring is effectively off.
    #[error("mirror endpoint not configured")]
    NotConfigured,

    /// Connection failure, timeout, or any other transport-level error.
    #[error("mirror request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("mirror rejected record with status {status}")]
    Rejected { status: StatusCode, body: String },
}

/// A successful mirror write.
#[derive(Debug, Clone)]
pub struct MirrorReceipt {
    pub status: StatusCode,
    /// Returned representation, `Null` when the body was not JSON.
    pub body: serde_json::Value,
}

/// Stateless request builder/sender for the remote tabular service.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MirrorClient {
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// POST one record to `{base}/api/database/records/{table}`.
    ///
    /// With `upsert`, conflict resolution is delegated entirely to the
    /// service via the `Prefer` header; the record's own primary key is
    /// the only idempotency key supplied.
    #[instrument(skip(self, record))]
    pub async fn sync_record<T: Serialize + ?Sized>(
        &self,
        table: &str,
        record: &T,
        upsert: bool,
    ) -> Result<MirrorReceipt, MirrorError> {
        if self.base_url.is_empty() {
            return Err(MirrorError::NotConfigured);
        }

        let url = format!("{}/api/database/records/{}", self.base_url, table);
        let prefer = if upsert {
            "return=representation,resolution=merge-duplicates"
        } else {
            "return=representation"
        };

        debug!(%url, upsert, "mirroring record");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("Prefer", prefer)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            debug!(%status, "record mirrored");
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
            Ok(MirrorReceipt { status, body })
        } else {
            warn!(%status, "mirror rejected record");
            Err(MirrorError::Rejected { status, body: text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::spawn_stub_mirror;
    use serde_json::json;

    #[tokio::test]
    async fn unreachable_endpoint_yields_err_not_panic() {
        // Nothing listens on this port; the connection is refused.
        let client = MirrorClient::new(&MirrorConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
        });

        let result = client
            .sync_record("plan", &json!({"id": 1, "name": "p"}), true)
            .await;
        assert!(matches!(result, Err(MirrorError::Transport(_))));
    }

    #[tokio::test]
    async fn server_error_yields_rejected() {
        let base_url = spawn_stub_mirror(StatusCode::INTERNAL_SERVER_ERROR).await;
        let client = MirrorClient::new(&MirrorConfig {
            base_url,
            api_key: "test-key".to_string(),
        });

        let result = client
            .sync_record("transactions", &json!({"amount": 30.0}), false)
            .await;
        match result {
            Err(MirrorError::Rejected { status, .. }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn created_yields_receipt() {
        let base_url = spawn_stub_mirror(StatusCode::CREATED).await;
        let client = MirrorClient::new(&MirrorConfig {
            base_url,
            api_key: "test-key".to_string(),
        });

        let receipt = client
            .sync_record("plan", &json!({"id": 7, "name": "p"}), true)
            .await
            .unwrap();
        assert_eq!(receipt.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn missing_configuration_yields_not_configured() {
        let client = MirrorClient::new(&MirrorConfig::default());
        let result = client.sync_record("plan", &json!({}), false).await;
        assert!(matches!(result, Err(MirrorError::NotConfigured)));
    }

    #[test]
    fn fold_keeps_small_ids_and_wraps_large_ones() {
        assert_eq!(fold_remote_fk(42), 42);
        assert_eq!(fold_remote_fk(i64::from(i32::MAX) - 1), i64::from(i32::MAX) - 1);
        assert_eq!(fold_remote_fk(i64::from(i32::MAX)), 0);
        // Two distinct locals can land on the same remote key.
        assert_eq!(
            fold_remote_fk(5),
            fold_remote_fk(5 + i64::from(i32::MAX))
        );
    }
}

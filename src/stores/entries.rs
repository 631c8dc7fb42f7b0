use std::sync::Arc;

use common::{ActivitySummary, DateRange};
use model::entities::entry::{self, EntryKind};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use store::{EntryPatch, EntryWithPlan, NewEntry};
use tokio::sync::RwLock;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::stores::CALORIES_PER_MINUTE;
use crate::sync::SyncService;

const RECENT_LIMIT: u64 = 10;

/// Summary plus the derived calorie estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryView {
    /// Total minutes of body-area tag records.
    pub income: f64,
    /// Total minutes of workout records.
    pub expense: f64,
    /// Linear estimate over workout minutes.
    pub estimated_calories: f64,
}

/// A category total plus its share of the overall total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryShare {
    pub category: String,
    pub category_icon: String,
    pub total: f64,
    pub count: i64,
    /// Rounded share of the grand total, 0 when there is none.
    pub percent: u32,
}

/// Published entry state.
#[derive(Debug, Clone, Default)]
pub struct EntrySnapshot {
    pub entries: Vec<EntryWithPlan>,
    pub recent: Vec<EntryWithPlan>,
    /// All-time totals.
    pub income: f64,
    pub expense: f64,
    pub is_syncing: bool,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct EntryStore {
    db: DatabaseConnection,
    sync: Arc<SyncService>,
    state: RwLock<EntrySnapshot>,
}

impl EntryStore {
    pub fn new(db: DatabaseConnection, sync: Arc<SyncService>) -> Self {
        Self {
            db,
            sync,
            state: RwLock::new(EntrySnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> EntrySnapshot {
        self.state.read().await.clone()
    }

    /// Drop all published state. Teardown hook for tests.
    pub async fn reset(&self) {
        *self.state.write().await = EntrySnapshot::default();
    }

    /// Local write first, then the best-effort mirror (owning plan
    /// upserted before the entry), then re-query and republish. Unlike
    /// plans, entry mirroring is not gated on a signed-in session.
    #[instrument(skip(self, entry))]
    pub async fn add_entry(&self, entry: NewEntry) -> store::Result<entry::Model> {
        let created = store::entries::create_entry(&self.db, entry).await?;

        let plan = match store::plans::plan_by_id(&self.db, created.account_id).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(%err, "could not load owning plan for mirror ordering");
                None
            }
        };
        self.sync.entry_created(plan.as_ref(), &created).await;

        self.refresh().await;
        Ok(created)
    }

    /// Local-only: remote update is unimplemented upstream.
    #[instrument(skip(self, patch))]
    pub async fn update_entry(&self, id: i64, patch: EntryPatch) -> store::Result<()> {
        store::entries::update_entry(&self.db, id, patch).await?;
        self.refresh().await;
        Ok(())
    }

    /// Local-only: the mirrored copy lingers until the remote is reset.
    #[instrument(skip(self))]
    pub async fn remove_entry(&self, id: i64) -> store::Result<()> {
        store::entries::delete_entry(&self.db, id).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn entry(&self, id: i64) -> store::Result<Option<EntryWithPlan>> {
        store::entries::entry_by_id(&self.db, id).await
    }

    pub async fn list(&self, limit: Option<u64>) -> store::Result<Vec<EntryWithPlan>> {
        store::entries::entries(&self.db, limit).await
    }

    /// Range summary with the calorie estimate. Query failures degrade
    /// to zeroes — callers cannot distinguish "no data" from "failed".
    pub async fn summary(&self, range: Option<DateRange>) -> SummaryView {
        let summary = match store::entries::summary(&self.db, range).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(%err, "summary query failed; returning zeroes");
                ActivitySummary::default()
            }
        };
        SummaryView {
            income: summary.income,
            expense: summary.expense,
            estimated_calories: summary.expense * CALORIES_PER_MINUTE,
        }
    }

    /// Category totals with distribution percentages, recomputed from
    /// the fetched rows on every call.
    pub async fn category_breakdown(
        &self,
        kind: EntryKind,
        range: Option<DateRange>,
    ) -> Vec<CategoryShare> {
        let totals = match store::entries::category_summary(&self.db, kind, range).await {
            Ok(totals) => totals,
            Err(err) => {
                warn!(%err, "category summary query failed; returning empty");
                Vec::new()
            }
        };
        let grand: f64 = totals.iter().map(|t| t.total).sum();
        totals
            .into_iter()
            .map(|t| CategoryShare {
                percent: if grand > 0.0 {
                    ((t.total / grand) * 100.0).round() as u32
                } else {
                    0
                },
                category: t.category,
                category_icon: t.category_icon,
                total: t.total,
                count: t.count,
            })
            .collect()
    }

    /// Re-send every local entry to the mirror, returning (ok, failed).
    pub async fn replay(&self) -> store::Result<(u32, u32)> {
        self.state.write().await.is_syncing = true;
        let result = self.sync.replay_entries(&self.db).await;
        self.state.write().await.is_syncing = false;
        result
    }

    /// Re-query local state and republish the snapshot.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        match self.load().await {
            Ok((entries, recent, summary)) => {
                let mut state = self.state.write().await;
                state.entries = entries;
                state.recent = recent;
                state.income = summary.income;
                state.expense = summary.expense;
                state.last_error = None;
            }
            Err(err) => {
                warn!(%err, "entry refresh failed; publishing empty snapshot");
                let mut state = self.state.write().await;
                state.entries = Vec::new();
                state.recent = Vec::new();
                state.income = 0.0;
                state.expense = 0.0;
                state.last_error = Some(err.to_string());
            }
        }
    }

    async fn load(
        &self,
    ) -> store::Result<(Vec<EntryWithPlan>, Vec<EntryWithPlan>, ActivitySummary)> {
        let entries = store::entries::entries(&self.db, None).await?;
        let recent = store::entries::entries(&self.db, Some(RECENT_LIMIT)).await?;
        let summary = store::entries::summary(&self.db, None).await?;
        Ok((entries, recent, summary))
    }
}

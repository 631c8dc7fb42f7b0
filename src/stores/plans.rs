use std::sync::Arc;

use chrono::Utc;
use common::Period;
use model::entities::entry::EntryKind;
use model::plan;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use store::{EntryWithPlan, NewPlan, PlanPatch};
use tokio::sync::RwLock;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::session::Session;
use crate::sync::SyncService;

/// Weekly completion of one plan's minute target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlanProgress {
    pub plan_id: i64,
    pub name: String,
    /// The plan's fixed weekly target in minutes.
    pub target_minutes: f64,
    /// Workout minutes logged against the plan this week.
    pub done_minutes: f64,
    /// Rounded completion rate; exceeds 100 when the target is beaten,
    /// 0 when the plan has no target.
    pub percent: u32,
}

/// Published plan state.
#[derive(Debug, Clone, Default)]
pub struct PlanSnapshot {
    pub plans: Vec<plan::Model>,
    pub total_balance: f64,
    pub progress: Vec<PlanProgress>,
    pub is_syncing: bool,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct PlanStore {
    db: DatabaseConnection,
    sync: Arc<SyncService>,
    session: Arc<Session>,
    state: RwLock<PlanSnapshot>,
}

impl PlanStore {
    pub fn new(db: DatabaseConnection, sync: Arc<SyncService>, session: Arc<Session>) -> Self {
        Self {
            db,
            sync,
            session,
            state: RwLock::new(PlanSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> PlanSnapshot {
        self.state.read().await.clone()
    }

    /// Drop all published state. Teardown hook for tests.
    pub async fn reset(&self) {
        *self.state.write().await = PlanSnapshot::default();
    }

    /// Local write first; the mirror attempt is gated on a signed-in
    /// session (entries are not) and its failure never surfaces here.
    #[instrument(skip(self, plan))]
    pub async fn add_plan(&self, plan: NewPlan) -> store::Result<plan::Model> {
        let created = store::plans::create_plan(&self.db, plan).await?;
        if self.session.is_signed_in().await {
            self.sync.plan_created(&created).await;
        }
        self.refresh().await;
        Ok(created)
    }

    /// Remote update is unimplemented upstream; the edit stays local
    /// until the next bulk replay re-upserts the plan.
    #[instrument(skip(self, patch))]
    pub async fn update_plan(&self, id: i64, patch: PlanPatch) -> store::Result<()> {
        store::plans::update_plan(&self.db, id, patch).await?;
        self.refresh().await;
        Ok(())
    }

    /// Remote delete is likewise local-only; mirrored rows linger.
    #[instrument(skip(self))]
    pub async fn remove_plan(&self, id: i64) -> store::Result<()> {
        store::plans::delete_plan(&self.db, id).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn plan(&self, id: i64) -> store::Result<Option<plan::Model>> {
        store::plans::plan_by_id(&self.db, id).await
    }

    /// Current weekly completion per plan, freshly computed.
    pub async fn progress(&self) -> Vec<PlanProgress> {
        self.refresh().await;
        self.state.read().await.progress.clone()
    }

    /// Re-send every local plan to the mirror, returning (ok, failed).
    pub async fn replay(&self) -> store::Result<(u32, u32)> {
        self.state.write().await.is_syncing = true;
        let result = self.sync.replay_plans(&self.db).await;
        self.state.write().await.is_syncing = false;
        result
    }

    /// Re-query local state and republish the snapshot. Read failures
    /// degrade to an empty snapshot carrying the error message; callers
    /// of the aggregate views cannot distinguish "empty" from "failed".
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        match self.load().await {
            Ok((plans, total_balance, week_entries)) => {
                let progress = compute_progress(&plans, &week_entries);
                let mut state = self.state.write().await;
                state.plans = plans;
                state.total_balance = total_balance;
                state.progress = progress;
                state.last_error = None;
            }
            Err(err) => {
                warn!(%err, "plan refresh failed; publishing empty snapshot");
                let mut state = self.state.write().await;
                state.plans = Vec::new();
                state.total_balance = 0.0;
                state.progress = Vec::new();
                state.last_error = Some(err.to_string());
            }
        }
    }

    async fn load(&self) -> store::Result<(Vec<plan::Model>, f64, Vec<EntryWithPlan>)> {
        let plans = store::plans::all_plans(&self.db).await?;
        let total_balance = store::plans::total_balance(&self.db).await?;
        let week = Period::Week.range(Utc::now().date_naive());
        let week_entries = store::entries::entries_by_date_range(&self.db, week).await?;
        Ok((plans, total_balance, week_entries))
    }
}

/// Pure function over already-fetched rows, recomputed on every refresh
/// rather than incrementally maintained.
fn compute_progress(plans: &[plan::Model], week_entries: &[EntryWithPlan]) -> Vec<PlanProgress> {
    plans
        .iter()
        .map(|plan| {
            let done_minutes: f64 = week_entries
                .iter()
                .filter(|e| e.account_id == plan.id && e.kind == EntryKind::Expense)
                .map(|e| e.amount)
                .sum();
            let percent = if plan.balance > 0.0 {
                ((done_minutes / plan.balance) * 100.0).round().max(0.0) as u32
            } else {
                0
            };
            PlanProgress {
                plan_id: plan.id,
                name: plan.name.clone(),
                target_minutes: plan.balance,
                done_minutes,
                percent,
            }
        })
        .collect()
}

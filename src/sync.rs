//! Sync orchestrator: sequences best-effort mirror writes around local
//! mutations and authentication events. By the time anything here runs,
//! the local store has already committed; mirror failures are logged and
//! dropped, never propagated.

use chrono::NaiveDate;
use common::ReplayReport;
use model::{entry, plan};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::mirror::{fold_remote_fk, MirrorClient, MirrorError, MirrorReceipt};

/// Remote table receiving plan upserts.
const PLAN_TABLE: &str = "plan";
/// Remote table receiving entry inserts.
const ENTRY_TABLE: &str = "transactions";
/// Remote table receiving user profile records.
const USER_TABLE: &str = "users";

/// Outbound plan record. The local id is reused verbatim as the remote
/// primary key, which is what makes upserts idempotent.
#[derive(Debug, Serialize)]
struct PlanRecord<'a> {
    id: i64,
    name: &'a str,
    balance: f64,
    icon: &'a str,
    color: &'a str,
}

/// Outbound entry record. No id: the remote side assigns its own, so
/// replayed entries append rather than merge.
#[derive(Debug, Serialize)]
struct EntryRecord<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    amount: f64,
    category: &'a str,
    category_icon: &'a str,
    account_id: i64,
    date: NaiveDate,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct UserRecord<'a> {
    email: &'a str,
    name: &'a str,
}

impl<'a> PlanRecord<'a> {
    fn from_model(plan: &'a plan::Model) -> Self {
        Self {
            id: plan.id,
            name: &plan.name,
            balance: plan.balance,
            icon: &plan.icon,
            color: &plan.color,
        }
    }
}

impl<'a> EntryRecord<'a> {
    fn from_model(entry: &'a entry::Model) -> Self {
        Self {
            kind: entry.kind.as_str(),
            amount: entry.amount,
            category: &entry.category,
            category_icon: &entry.category_icon,
            account_id: fold_remote_fk(entry.account_id),
            date: entry.date,
            description: &entry.description,
        }
    }
}

#[derive(Debug)]
pub struct SyncService {
    mirror: MirrorClient,
}

impl SyncService {
    pub fn new(mirror: MirrorClient) -> Self {
        Self { mirror }
    }

    /// Mirror a newly created plan. Failures are non-fatal by contract;
    /// remote update and delete are unimplemented upstream, so edits stay
    /// local until the next bulk replay re-upserts the plan.
    #[instrument(skip(self, plan), fields(plan_id = plan.id))]
    pub async fn plan_created(&self, plan: &plan::Model) {
        if let Err(err) = self.push_plan(plan).await {
            warn!(%err, "plan mirror failed; local copy remains authoritative");
        }
    }

    /// Mirror a newly created entry, pushing the owning plan first so the
    /// remote foreign key has something to point at. The two writes are
    /// independent: a failed plan push does not cancel the entry push,
    /// and ordering is best-effort, not guaranteed remotely.
    #[instrument(skip(self, plan, entry), fields(entry_id = entry.id))]
    pub async fn entry_created(&self, plan: Option<&plan::Model>, entry: &entry::Model) {
        if let Some(plan) = plan {
            if let Err(err) = self.push_plan(plan).await {
                warn!(%err, plan_id = plan.id, "plan mirror failed before entry push");
            }
        }
        if let Err(err) = self.push_entry(entry).await {
            warn!(%err, "entry mirror failed; local copy remains authoritative");
        }
    }

    /// Mirror the signed-in user's profile record.
    #[instrument(skip(self))]
    pub async fn user_signed_in(&self, email: &str, name: &str) {
        let record = UserRecord { email, name };
        if let Err(err) = self.mirror.sync_record(USER_TABLE, &record, false).await {
            warn!(%err, "user mirror failed");
        }
    }

    /// Re-send every local plan sequentially. Returns (ok, failed);
    /// failures are counted, never rolled back or retried here.
    #[instrument(skip(self, db))]
    pub async fn replay_plans(&self, db: &DatabaseConnection) -> store::Result<(u32, u32)> {
        let mut ok = 0;
        let mut failed = 0;
        for plan in store::plans::all_plans(db).await? {
            match self.push_plan(&plan).await {
                Ok(_) => ok += 1,
                Err(err) => {
                    warn!(%err, plan_id = plan.id, "plan replay failed");
                    failed += 1;
                }
            }
        }
        info!(ok, failed, "plan replay finished");
        Ok((ok, failed))
    }

    /// Re-send every local entry sequentially, counting outcomes.
    #[instrument(skip(self, db))]
    pub async fn replay_entries(&self, db: &DatabaseConnection) -> store::Result<(u32, u32)> {
        let mut ok = 0;
        let mut failed = 0;
        for entry in store::entries::all_entries(db).await? {
            match self.push_entry(&entry).await {
                Ok(_) => ok += 1,
                Err(err) => {
                    warn!(%err, entry_id = entry.id, "entry replay failed");
                    failed += 1;
                }
            }
        }
        info!(ok, failed, "entry replay finished");
        Ok((ok, failed))
    }

    /// Full bulk replay: every plan, then every entry.
    pub async fn replay_all(&self, db: &DatabaseConnection) -> store::Result<ReplayReport> {
        let (plans_ok, plans_failed) = self.replay_plans(db).await?;
        let (entries_ok, entries_failed) = self.replay_entries(db).await?;
        Ok(ReplayReport {
            plans_ok,
            plans_failed,
            entries_ok,
            entries_failed,
        })
    }

    async fn push_plan(&self, plan: &plan::Model) -> Result<MirrorReceipt, MirrorError> {
        self.mirror
            .sync_record(PLAN_TABLE, &PlanRecord::from_model(plan), true)
            .await
    }

    async fn push_entry(&self, entry: &entry::Model) -> Result<MirrorReceipt, MirrorError> {
        self.mirror
            .sync_record(ENTRY_TABLE, &EntryRecord::from_model(entry), false)
            .await
    }
}

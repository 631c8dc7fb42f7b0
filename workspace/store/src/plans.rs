//! Plan persistence and aggregates.

use chrono::Utc;
use common::LooseNumber;
use model::plan;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, instrument};

use crate::error::Result;

/// Fields for creating a plan. `balance` goes through loose-number
/// coercion, so a `"150"` from a client stores the same as `150`.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub balance: LooseNumber,
    pub icon: String,
    pub color: String,
}

/// Partial update for a plan. `None` fields are left untouched; an
/// all-`None` patch never reaches the database.
#[derive(Debug, Clone, Default)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub balance: Option<LooseNumber>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl PlanPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.balance.is_none()
            && self.icon.is_none()
            && self.color.is_none()
    }
}

#[derive(Debug, FromQueryResult)]
struct BalanceTotal {
    total: Option<f64>,
}

#[instrument(skip(db))]
pub async fn create_plan(db: &DatabaseConnection, plan: NewPlan) -> Result<plan::Model> {
    let row = plan::ActiveModel {
        name: Set(plan.name),
        balance: Set(plan.balance.as_minutes()),
        icon: Set(plan.icon),
        color: Set(plan.color),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let inserted = row.insert(db).await?;
    debug!(id = inserted.id, "plan created");
    Ok(inserted)
}

/// Apply a partial update. Updating a nonexistent id affects zero rows
/// and completes without error, matching the store's contract.
#[instrument(skip(db))]
pub async fn update_plan(db: &DatabaseConnection, id: i64, patch: PlanPatch) -> Result<()> {
    if patch.is_empty() {
        return Ok(());
    }

    let mut update = plan::Entity::update_many().filter(plan::Column::Id.eq(id));
    if let Some(name) = patch.name {
        update = update.col_expr(plan::Column::Name, Expr::value(name));
    }
    if let Some(balance) = patch.balance {
        update = update.col_expr(plan::Column::Balance, Expr::value(balance.as_minutes()));
    }
    if let Some(icon) = patch.icon {
        update = update.col_expr(plan::Column::Icon, Expr::value(icon));
    }
    if let Some(color) = patch.color {
        update = update.col_expr(plan::Column::Color, Expr::value(color));
    }

    let result = update.exec(db).await?;
    debug!(id, rows = result.rows_affected, "plan updated");
    Ok(())
}

/// Delete a plan; the schema's `ON DELETE CASCADE` removes its entries.
#[instrument(skip(db))]
pub async fn delete_plan(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = plan::Entity::delete_by_id(id).exec(db).await?;
    debug!(id, rows = result.rows_affected, "plan deleted");
    Ok(())
}

pub async fn plan_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<plan::Model>> {
    Ok(plan::Entity::find_by_id(id).one(db).await?)
}

/// All plans, newest first.
#[instrument(skip(db))]
pub async fn all_plans(db: &DatabaseConnection) -> Result<Vec<plan::Model>> {
    Ok(plan::Entity::find()
        .order_by(plan::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

/// Sum of all weekly targets, coalesced to 0 and NaN-guarded.
#[instrument(skip(db))]
pub async fn total_balance(db: &DatabaseConnection) -> Result<f64> {
    let row = plan::Entity::find()
        .select_only()
        .column_as(plan::Column::Balance.sum(), "total")
        .into_model::<BalanceTotal>()
        .one(db)
        .await?;
    let total = row.and_then(|r| r.total).unwrap_or(0.0);
    Ok(if total.is_finite() { total } else { 0.0 })
}

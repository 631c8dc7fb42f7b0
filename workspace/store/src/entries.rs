//! Entry persistence, joined reads and the aggregate queries the
//! statistics views are built from.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use common::{ActivitySummary, CategoryTotal, DateRange, LooseNumber};
use model::entities::entry::{self, EntryKind};
use model::plan;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};

/// Fields for creating an entry. An empty description defaults to the
/// category name; `amount` goes through loose-number coercion.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub amount: LooseNumber,
    pub category: String,
    pub category_icon: String,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
}

/// Partial update for an entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub kind: Option<EntryKind>,
    pub amount: Option<LooseNumber>,
    pub category: Option<String>,
    pub category_icon: Option<String>,
    pub account_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.category_icon.is_none()
            && self.account_id.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// An entry joined with its plan's display name.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct EntryWithPlan {
    pub id: i64,
    pub kind: EntryKind,
    pub amount: f64,
    pub category: String,
    pub category_icon: String,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub plan_name: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct KindTotal {
    kind: EntryKind,
    total: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    category: String,
    category_icon: String,
    total: Option<f64>,
    count: i64,
}

fn joined() -> Select<entry::Entity> {
    entry::Entity::find()
        .select_only()
        .columns([
            entry::Column::Id,
            entry::Column::Amount,
            entry::Column::Category,
            entry::Column::CategoryIcon,
            entry::Column::AccountId,
            entry::Column::Date,
            entry::Column::Description,
            entry::Column::CreatedAt,
        ])
        .column_as(entry::Column::Kind, "kind")
        .column_as(plan::Column::Name, "plan_name")
        .join(JoinType::LeftJoin, entry::Relation::Plan.def())
}

/// Insert a new entry. The owning plan's `balance` is a fixed weekly
/// target and is never touched here.
#[instrument(skip(db))]
pub async fn create_entry(db: &DatabaseConnection, entry: NewEntry) -> Result<entry::Model> {
    let description = if entry.description.trim().is_empty() {
        entry.category.clone()
    } else {
        entry.description
    };
    let row = entry::ActiveModel {
        kind: Set(entry.kind),
        amount: Set(entry.amount.as_minutes()),
        category: Set(entry.category),
        category_icon: Set(entry.category_icon),
        account_id: Set(entry.account_id),
        date: Set(entry.date),
        description: Set(description),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let inserted = row.insert(db).await?;
    debug!(id = inserted.id, "entry created");
    Ok(inserted)
}

/// Apply a partial update. Unlike plans, updating a missing entry is an
/// error: the row is fetched first to validate existence.
#[instrument(skip(db))]
pub async fn update_entry(db: &DatabaseConnection, id: i64, patch: EntryPatch) -> Result<()> {
    let existing = entry::Entity::find_by_id(id).one(db).await?;
    if existing.is_none() {
        return Err(StoreError::NotFound { entity: "entry", id });
    }
    if patch.is_empty() {
        return Ok(());
    }

    let mut update = entry::Entity::update_many().filter(entry::Column::Id.eq(id));
    if let Some(kind) = patch.kind {
        update = update.col_expr(entry::Column::Kind, Expr::value(kind.as_str()));
    }
    if let Some(amount) = patch.amount {
        update = update.col_expr(entry::Column::Amount, Expr::value(amount.as_minutes()));
    }
    if let Some(category) = patch.category {
        update = update.col_expr(entry::Column::Category, Expr::value(category));
    }
    if let Some(category_icon) = patch.category_icon {
        update = update.col_expr(entry::Column::CategoryIcon, Expr::value(category_icon));
    }
    if let Some(account_id) = patch.account_id {
        update = update.col_expr(entry::Column::AccountId, Expr::value(account_id));
    }
    if let Some(date) = patch.date {
        update = update.col_expr(entry::Column::Date, Expr::value(date));
    }
    if let Some(description) = patch.description {
        update = update.col_expr(entry::Column::Description, Expr::value(description));
    }

    let result = update.exec(db).await?;
    debug!(id, rows = result.rows_affected, "entry updated");
    Ok(())
}

#[instrument(skip(db))]
pub async fn delete_entry(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = entry::Entity::delete_by_id(id).exec(db).await?;
    debug!(id, rows = result.rows_affected, "entry deleted");
    Ok(())
}

/// Entries with plan names, newest activity first, optionally limited.
#[instrument(skip(db))]
pub async fn entries(db: &DatabaseConnection, limit: Option<u64>) -> Result<Vec<EntryWithPlan>> {
    Ok(joined()
        .order_by(entry::Column::Date, Order::Desc)
        .order_by(entry::Column::CreatedAt, Order::Desc)
        .limit(limit)
        .into_model::<EntryWithPlan>()
        .all(db)
        .await?)
}

/// Entries whose activity date falls inside the inclusive range.
#[instrument(skip(db))]
pub async fn entries_by_date_range(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<EntryWithPlan>> {
    Ok(joined()
        .filter(entry::Column::Date.between(range.start, range.end))
        .order_by(entry::Column::Date, Order::Desc)
        .into_model::<EntryWithPlan>()
        .all(db)
        .await?)
}

pub async fn entry_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<EntryWithPlan>> {
    Ok(joined()
        .filter(entry::Column::Id.eq(id))
        .into_model::<EntryWithPlan>()
        .one(db)
        .await?)
}

/// Raw entry rows, oldest first. Used by the bulk replay.
pub async fn all_entries(db: &DatabaseConnection) -> Result<Vec<entry::Model>> {
    Ok(entry::Entity::find()
        .order_by(entry::Column::Id, Order::Asc)
        .all(db)
        .await?)
}

/// Minute totals per kind, optionally date-filtered. Missing kinds come
/// back as 0; a NULL or non-finite sum is coerced to 0 so aggregates can
/// never carry NaN into the UI.
#[instrument(skip(db))]
pub async fn summary(
    db: &DatabaseConnection,
    range: Option<DateRange>,
) -> Result<ActivitySummary> {
    let mut query = entry::Entity::find()
        .select_only()
        .column_as(entry::Column::Kind, "kind")
        .column_as(entry::Column::Amount.sum(), "total")
        .group_by(entry::Column::Kind);
    if let Some(range) = range {
        query = query.filter(entry::Column::Date.between(range.start, range.end));
    }

    let rows = query.into_model::<KindTotal>().all(db).await?;
    let mut summary = ActivitySummary::default();
    for row in rows {
        let total = row.total.filter(|t| t.is_finite()).unwrap_or(0.0);
        match row.kind {
            EntryKind::Income => summary.income = total,
            EntryKind::Expense => summary.expense = total,
        }
    }
    Ok(summary)
}

/// Minute totals per category within one kind, largest total first.
#[instrument(skip(db))]
pub async fn category_summary(
    db: &DatabaseConnection,
    kind: EntryKind,
    range: Option<DateRange>,
) -> Result<Vec<CategoryTotal>> {
    let mut query = entry::Entity::find()
        .select_only()
        .columns([entry::Column::Category, entry::Column::CategoryIcon])
        .column_as(entry::Column::Amount.sum(), "total")
        .column_as(entry::Column::Id.count(), "count")
        .filter(entry::Column::Kind.eq(kind))
        .group_by(entry::Column::Category)
        .order_by_desc(entry::Column::Amount.sum());
    if let Some(range) = range {
        query = query.filter(entry::Column::Date.between(range.start, range.end));
    }

    let rows = query.into_model::<CategoryRow>().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let total = row.total.filter(|t| t.is_finite()).unwrap_or(0.0);
            CategoryTotal {
                category: row.category,
                category_icon: row.category_icon,
                total,
                count: row.count,
            }
        })
        .collect())
}

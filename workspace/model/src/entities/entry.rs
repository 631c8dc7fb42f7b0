use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which vocabulary an entry's category is drawn from. The string values
/// are the legacy wire tags shared with the remote mirror.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A body-area tag record.
    #[sea_orm(string_value = "income")]
    Income,
    /// A logged workout record.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A single logged activity record. The table keeps its legacy name
/// `transactions`, matching the remote mirror's table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "type")]
    pub kind: EntryKind,
    /// Minutes of activity. Always finite; the store coerces on the way in.
    pub amount: f64,
    pub category: String,
    pub category_icon: String,
    /// Owning plan.
    pub account_id: i64,
    /// Activity date at day granularity; range queries are inclusive.
    pub date: NaiveDate,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plan::Entity",
        from = "Column::AccountId",
        to = "super::plan::Column::Id",
        on_delete = "Cascade"
    )]
    Plan,
}

impl Related<super::plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

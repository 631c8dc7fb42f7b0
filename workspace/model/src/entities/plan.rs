use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A weekly training plan.
///
/// The table keeps its legacy name `accounts` (and `balance` for the
/// weekly target) so locally assigned ids can be reused verbatim as the
/// remote mirror's primary keys without a mapping table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Weekly target in minutes of activity. A fixed goal: logging
    /// entries never recomputes it.
    pub balance: f64,
    pub icon: String,
    pub color: String,
    /// Set at creation, never updated.
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A plan owns many logged entries; deleting the plan cascades to
    /// them locally. The remote mirror has no such cleanup.
    #[sea_orm(has_many = "super::entry::Entity")]
    Entry,
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

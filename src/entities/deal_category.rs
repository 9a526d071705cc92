//! Deal ↔ category join table. The `(deal_id, category_id)` pair is the primary key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `deal_categories` row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_categories")]
pub struct Model {
    /// Linked deal
    #[sea_orm(primary_key, auto_increment = false)]
    pub deal_id: i64,
    /// Linked category
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: i64,
}

/// Both sides of the link
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The deal side
    #[sea_orm(
        belongs_to = "super::deal::Entity",
        from = "Column::DealId",
        to = "super::deal::Column::Id",
        on_delete = "Cascade"
    )]
    Deal,
    /// The category side
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deal.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

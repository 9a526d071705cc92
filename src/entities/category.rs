//! Category entity - A browsing category shared by stores and deals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Electronics")
    pub title: String,
    /// URL-safe unique identifier, `[a-z0-9-]+`
    #[sea_orm(unique)]
    pub slug: String,
    /// Position in navigation, ascending
    pub sort_order: i32,
    /// Signed URL of the category image
    pub image_url: Option<String>,
    /// Whether the category is shown on the public site
    pub is_active: bool,
}

/// Defines relationships between Category and the join tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Deal links pointing at this category
    #[sea_orm(has_many = "super::deal_category::Entity")]
    DealCategories,
    /// Store links pointing at this category
    #[sea_orm(has_many = "super::store_category::Entity")]
    StoreCategories,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        super::deal_category::Relation::Deal.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::deal_category::Relation::Category.def().rev())
    }
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_category::Relation::Store.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

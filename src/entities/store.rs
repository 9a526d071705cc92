//! Store entity - A merchant whose deals are aggregated on the platform.
//!
//! Besides its own profile fields, a store carries a cached summary of its best deal
//! (`discount`, `discount_unit`, `discount_type`, `discount_id`) and the number of deals
//! it owns (`total_offers`). Those columns are only ever written by
//! [`crate::core::summary::recompute_store_summary`].

use super::deal::DealType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    /// Unique identifier for the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Acme Outdoors")
    pub title: String,
    /// URL-safe unique identifier, `[a-z0-9-]+`
    #[sea_orm(unique)]
    pub slug: String,
    /// Country the store operates in
    pub country_id: i64,
    /// Optional contact phone number
    pub phone: Option<String>,
    /// Store website
    pub website_url: Option<String>,
    /// Signed URL of the profile picture in object storage
    pub profile_picture_url: Option<String>,
    /// Signed URL of the cover image in object storage
    pub cover_url: Option<String>,
    /// Whether the store is shown on the public site
    pub is_active: bool,
    /// Number of deals owned by this store
    pub total_offers: i32,
    /// Numeric value of the featured deal (0 for BOGO/free shipping)
    pub discount: Option<f64>,
    /// Unit of the featured deal: `%`, a currency code, or `""` for BOGO/free shipping
    pub discount_unit: Option<String>,
    /// Type of the featured deal
    pub discount_type: Option<DealType>,
    /// Id of the featured deal
    pub discount_id: Option<i64>,
    /// When the store was created
    pub created_at: DateTime,
    /// When the store was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Store and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One store has many deals
    #[sea_orm(has_many = "super::deal::Entity")]
    Deals,
    /// Each store belongs to one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// Category links of this store
    #[sea_orm(has_many = "super::store_category::Entity")]
    StoreCategories,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_category::Relation::Store.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

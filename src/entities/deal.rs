//! Deal entity - A single offer published by a store.
//!
//! A deal has a [`DealType`]. Only `discount` and `amountOff` deals carry a numeric
//! `discount`; `bogo` and `freeShipping` deals store it as NULL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of offer a deal represents.
///
/// The string values match the values stored in the `type` column and used by the
/// public site, so they are camelCase.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "camelCase")]
pub enum DealType {
    /// Percentage off (`discount` is 1..=100, unit `%`)
    #[sea_orm(string_value = "discount")]
    Discount,
    /// Fixed amount off (`discount` > 0, unit is a currency)
    #[sea_orm(string_value = "amountOff")]
    AmountOff,
    /// Buy one get one
    #[sea_orm(string_value = "bogo")]
    Bogo,
    /// Free shipping
    #[sea_orm(string_value = "freeShipping")]
    FreeShipping,
}

impl DealType {
    /// Ranked deals compete on their numeric discount; the others are only used
    /// as a fallback when a store has no ranked deal.
    #[must_use]
    pub const fn is_ranked(self) -> bool {
        matches!(self, Self::Discount | Self::AmountOff)
    }

    /// The value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::AmountOff => "amountOff",
            Self::Bogo => "bogo",
            Self::FreeShipping => "freeShipping",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    /// Unique identifier for the deal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline shown to shoppers
    pub title: String,
    /// URL-safe unique identifier, `[a-z0-9-]+`
    #[sea_orm(unique)]
    pub slug: String,
    /// Coupon code, `[A-Z0-9]+`
    pub code: String,
    /// Optional long description
    pub description: Option<String>,
    /// Store that owns this deal
    pub store_id: i64,
    /// Country the deal is valid in
    pub country_id: i64,
    /// Kind of offer
    #[sea_orm(column_name = "type")]
    pub deal_type: DealType,
    /// Numeric discount, only for `discount` and `amountOff`
    pub discount: Option<f64>,
    /// `%` for `discount`, a currency unit for `amountOff`, NULL otherwise
    pub discount_unit: Option<String>,
    /// Landing page of the deal
    pub url: Option<String>,
    /// Whether the deal is published
    pub is_active: bool,
    /// When the deal stops being valid
    pub expiry_date: DateTimeUtc,
    /// When the deal was created
    pub created_at: DateTime,
    /// When the deal was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Deal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deal belongs to one store
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id"
    )]
    Store,
    /// Each deal belongs to one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// Category links of this deal
    #[sea_orm(has_many = "super::deal_category::Entity")]
    DealCategories,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::deal_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::deal_category::Relation::Deal.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

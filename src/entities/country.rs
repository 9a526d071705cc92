//! Country entity - Where stores operate and deals are valid.
//!
//! `currency` and `currency_code` are JSON objects keyed by locale, e.g.
//! `{"en": "USD"}`. The admin tooling only ever reads the `en` key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Country database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    /// Unique identifier for the country
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "United States")
    pub value: String,
    /// ISO 3166-1 alpha-2 code (e.g., "US")
    #[sea_orm(unique)]
    pub code: String,
    /// Localised currency display name or symbol, keyed by locale
    pub currency: Json,
    /// Localised ISO 4217 currency code, keyed by locale
    pub currency_code: Json,
    /// Flag image URL
    pub image_url: Option<String>,
}

/// Defines relationships between Country and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Stores operating in this country
    #[sea_orm(has_many = "super::store::Entity")]
    Stores,
    /// Deals valid in this country
    #[sea_orm(has_many = "super::deal::Entity")]
    Deals,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stores.def()
    }
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

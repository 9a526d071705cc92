//! Shared test utilities for `DealDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::SummarySettings,
    core::{category, country, deal, store},
    entities::{self, DealType},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in the temp dir with all tables initialized.
///
/// Unlike `sqlite::memory:`, every pooled connection sees the same data, so tasks on
/// different threads can mutate it concurrently. Returns the path so the test can
/// remove the file afterwards.
pub async fn setup_file_test_db(name: &str) -> Result<(DatabaseConnection, PathBuf)> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let path = std::env::temp_dir().join(format!(
        "dealdesk-{name}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    let db = sea_orm::Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, path))
}

/// Creates a test country.
///
/// # Arguments
/// * `code` - Two-letter country code, also used as the display name
/// * `currency_code` - ISO currency code stored under the `en` locale
pub async fn create_test_country(
    db: &DatabaseConnection,
    code: &str,
    currency_code: &str,
) -> Result<entities::country::Model> {
    country::create_country(
        db,
        format!("Country {code}"),
        code.to_string(),
        "$".to_string(),
        currency_code.to_string(),
        "en",
    )
    .await
}

/// Creates a country whose currency code map is empty.
pub async fn create_country_without_code(
    db: &DatabaseConnection,
) -> Result<entities::country::Model> {
    let country = entities::country::ActiveModel {
        value: Set("Nowhere".to_string()),
        code: Set("XX".to_string()),
        currency: Set(json!({})),
        currency_code: Set(json!({})),
        image_url: Set(None),
        ..Default::default()
    };
    country.insert(db).await.map_err(Into::into)
}

/// Store input with sensible defaults.
///
/// # Defaults
/// * no contact details or images
/// * `is_active`: true
/// * categories untouched
#[must_use]
pub fn store_input(title: &str, slug: &str, country_id: i64) -> store::StoreInput {
    store::StoreInput {
        title: title.to_string(),
        slug: slug.to_string(),
        country_id,
        is_active: true,
        ..store::StoreInput::default()
    }
}

/// Creates a test store titled after its slug.
pub async fn create_test_store(
    db: &DatabaseConnection,
    slug: &str,
    country_id: i64,
) -> Result<entities::store::Model> {
    store::create_store(db, store_input(&format!("Store {slug}"), slug, country_id)).await
}

/// Sets up a complete test environment with a US store.
/// Returns (db, settings, country, store) for common test scenarios.
pub async fn setup_with_store() -> Result<(
    DatabaseConnection,
    SummarySettings,
    entities::country::Model,
    entities::store::Model,
)> {
    let db = setup_test_db().await?;
    let country = create_test_country(&db, "US", "USD").await?;
    let store = store::create_store(&db, store_input("Test Store", "test-store", country.id)).await?;
    Ok((db, SummarySettings::default(), country, store))
}

/// Deal input for explicit store and country ids.
///
/// # Defaults
/// * `code`: "SAVE10"
/// * `is_active`: true
/// * `expiry_date`: 30 days from now
/// * unit left to the type's default
#[must_use]
pub fn deal_input_for(
    store_id: i64,
    country_id: i64,
    slug: &str,
    deal_type: DealType,
    discount: Option<f64>,
) -> deal::DealInput {
    deal::DealInput {
        title: format!("Deal {slug}"),
        slug: slug.to_string(),
        code: "SAVE10".to_string(),
        description: None,
        store_id,
        country_id,
        deal_type,
        discount,
        discount_unit: None,
        url: None,
        is_active: true,
        expiry_date: Utc::now() + Duration::days(30),
        category_ids: None,
    }
}

/// Deal input owned by `store` and valid in the store's country.
#[must_use]
pub fn deal_input(
    store: &entities::store::Model,
    slug: &str,
    deal_type: DealType,
    discount: Option<f64>,
) -> deal::DealInput {
    deal_input_for(store.id, store.country_id, slug, deal_type, discount)
}

/// Creates a test deal through the regular create path, so the store summary is
/// recomputed as in production.
pub async fn create_test_deal(
    db: &DatabaseConnection,
    settings: &SummarySettings,
    store_id: i64,
    slug: &str,
    deal_type: DealType,
    discount: Option<f64>,
) -> Result<entities::deal::Model> {
    let owner = store::get_store_by_id(db, store_id)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;
    let change =
        deal::create_deal(db, settings, deal_input(&owner, slug, deal_type, discount)).await?;
    Ok(change.deal)
}

/// Creates an active test category titled after its slug.
pub async fn create_test_category(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        category::CategoryInput {
            title: format!("Category {slug}"),
            slug: slug.to_string(),
            sort_order: 0,
            image_url: None,
            is_active: true,
        },
    )
    .await
}

/// An unsaved deal row for the pure summary functions.
///
/// Belongs to store 1 and country 1.
#[must_use]
pub fn deal_fixture(
    id: i64,
    deal_type: DealType,
    discount: Option<f64>,
    discount_unit: Option<&str>,
) -> entities::deal::Model {
    let now = Utc::now();
    entities::deal::Model {
        id,
        title: format!("Deal {id}"),
        slug: format!("deal-{id}"),
        code: "CODE".to_string(),
        description: None,
        store_id: 1,
        country_id: 1,
        deal_type,
        discount,
        discount_unit: discount_unit.map(ToString::to_string),
        url: None,
        is_active: true,
        expiry_date: now + Duration::days(30),
        created_at: now.naive_utc(),
        updated_at: now.naive_utc(),
    }
}

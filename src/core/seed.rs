//! Reference data seeding from `config.toml`.
//!
//! Countries are matched by code and categories by slug. Rows that already exist are
//! left untouched, so seeding on every start-up is safe.

use crate::{
    config::Settings,
    core::{category, country},
    entities::country as country_entity,
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// How many rows a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// New countries
    pub countries: usize,
    /// New categories
    pub categories: usize,
}

/// Inserts the configured countries and categories that are not in the database yet.
pub async fn seed_reference_data(db: &DatabaseConnection, settings: &Settings) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &settings.countries {
        if country::get_country_by_code(db, &seed.code).await?.is_some() {
            continue;
        }
        let created = country::create_country(
            db,
            seed.value.clone(),
            seed.code.clone(),
            seed.currency.clone(),
            seed.currency_code.clone(),
            &settings.summary.locale,
        )
        .await?;
        if let Some(image_url) = crate::core::validate::url("image_url", seed.image_url.as_deref())? {
            let mut active: country_entity::ActiveModel = created.into();
            active.image_url = Set(Some(image_url));
            active.update(db).await?;
        }
        report.countries += 1;
    }

    for seed in &settings.categories {
        if category::get_category_by_slug(db, &seed.slug).await?.is_some() {
            continue;
        }
        category::create_category(
            db,
            category::CategoryInput {
                title: seed.title.clone(),
                slug: seed.slug.clone(),
                sort_order: seed.sort_order,
                image_url: None,
                is_active: true,
            },
        )
        .await?;
        report.categories += 1;
    }

    if report != SeedReport::default() {
        info!(
            "Seeded {} countries and {} categories",
            report.countries, report.categories
        );
    }
    Ok(report)
}

//! Parsing and formatting helpers shared by the management commands.

use crate::{
    core::{country, store},
    entities::{DealType, country as country_entity, deal, store as store_entity},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;

/// Option value that clears an optional field in `update` subcommands.
pub const CLEAR_VALUE: &str = "-";

/// File extensions accepted for store and category images.
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Splits a comma-separated slug list; blank entries are dropped.
#[must_use]
pub fn parse_slug_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Parses `YYYY-MM-DD` as the last second of that day in UTC.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation("expiry", "must be a date like 2026-12-31"))?;
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::validation("expiry", "is not a valid date"))
}

/// Applies an optional text option to a stored value.
///
/// An omitted option keeps `current`. A blank value or [`CLEAR_VALUE`] clears it, since
/// Discord will not send an empty string option.
#[must_use]
pub fn edit_optional(new: Option<String>, current: Option<&str>) -> Option<String> {
    match new {
        None => current.map(str::to_string),
        Some(value) if matches!(value.trim(), "" | CLEAR_VALUE) => None,
        Some(value) => Some(value),
    }
}

/// Rejects uploads that are not images, judged by content type or file extension.
fn ensure_image(content_type: Option<&str>, file_name: &str) -> Result<()> {
    let is_image = match content_type {
        Some(content_type) => content_type.starts_with("image/"),
        None => file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())),
    };
    if is_image {
        Ok(())
    } else {
        Err(Error::validation("file", "must be an image"))
    }
}

/// Downloads an image attachment.
pub async fn download_image(attachment: &serenity::Attachment) -> Result<Vec<u8>> {
    ensure_image(attachment.content_type.as_deref(), &attachment.filename)?;
    Ok(attachment.download().await?)
}

/// Looks up a store by slug or fails with [`Error::StoreNotFound`].
pub async fn find_store(db: &DatabaseConnection, slug: &str) -> Result<store_entity::Model> {
    store::get_store_by_slug(db, slug)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: slug.to_string(),
        })
}

/// Looks up a country by code or fails with [`Error::CountryNotFound`].
pub async fn find_country(db: &DatabaseConnection, code: &str) -> Result<country_entity::Model> {
    country::get_country_by_code(db, code)
        .await?
        .ok_or_else(|| Error::CountryNotFound {
            key: code.to_string(),
        })
}

/// Human-readable discount of a deal, e.g. `25%`, `10 USD`, `BOGO`.
#[must_use]
pub fn describe_offer(
    deal_type: DealType,
    discount: Option<f64>,
    discount_unit: Option<&str>,
) -> String {
    match deal_type {
        DealType::Discount => format!("{}%", discount.unwrap_or(0.0)),
        DealType::AmountOff => format!(
            "{} {}",
            discount.unwrap_or(0.0),
            discount_unit.unwrap_or("$")
        ),
        DealType::Bogo => "BOGO".to_string(),
        DealType::FreeShipping => "Free shipping".to_string(),
    }
}

/// One-line summary of what a store currently features.
#[must_use]
pub fn describe_store_summary(store: &store_entity::Model) -> String {
    match store.discount_type {
        Some(deal_type) => format!(
            "{} (deal #{}) · {} offers",
            describe_offer(deal_type, store.discount, store.discount_unit.as_deref()),
            store.discount_id.unwrap_or_default(),
            store.total_offers
        ),
        None => format!("No featured deal · {} offers", store.total_offers),
    }
}

/// One-line summary of a deal for list embeds.
#[must_use]
pub fn describe_deal(deal: &deal::Model) -> String {
    format!(
        "`{}` · {} · expires {}{}",
        deal.code,
        describe_offer(deal.deal_type, deal.discount, deal.discount_unit.as_deref()),
        deal.expiry_date.format("%Y-%m-%d"),
        if deal.is_active { "" } else { " · inactive" }
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::deal_fixture;
    use chrono::Timelike;

    #[test]
    fn test_parse_slug_list() {
        assert_eq!(parse_slug_list(" Food, travel,,  "), ["food", "travel"]);
        assert!(parse_slug_list("").is_empty());
    }

    #[test]
    fn test_parse_expiry_end_of_day() {
        let expiry = parse_expiry("2026-12-31").unwrap();
        assert_eq!(expiry.date_naive().to_string(), "2026-12-31");
        assert_eq!(expiry.hour(), 23);
        assert!(matches!(
            parse_expiry("31/12/2026"),
            Err(Error::Validation { field: "expiry", .. })
        ));
    }

    #[test]
    fn test_edit_optional_keeps_sets_and_clears() {
        assert_eq!(edit_optional(None, Some("+15551234567")).as_deref(), Some("+15551234567"));
        assert_eq!(edit_optional(None, None), None);
        assert_eq!(
            edit_optional(Some("https://acme.example".to_string()), None).as_deref(),
            Some("https://acme.example")
        );
        assert_eq!(edit_optional(Some("  ".to_string()), Some("old")), None);
        assert_eq!(edit_optional(Some(" - ".to_string()), Some("old")), None);
    }

    #[test]
    fn test_ensure_image() {
        assert!(ensure_image(Some("image/png"), "logo.png").is_ok());
        assert!(ensure_image(None, "Banner.JPG").is_ok());
        assert!(matches!(
            ensure_image(Some("application/pdf"), "logo.png"),
            Err(Error::Validation { field: "file", .. })
        ));
        assert!(ensure_image(None, "notes.txt").is_err());
        assert!(ensure_image(None, "banner").is_err());
    }

    #[test]
    fn test_describe_offer() {
        assert_eq!(describe_offer(DealType::Discount, Some(25.0), Some("%")), "25%");
        assert_eq!(describe_offer(DealType::AmountOff, Some(10.0), Some("USD")), "10 USD");
        assert_eq!(describe_offer(DealType::Bogo, Some(0.0), Some("")), "BOGO");
    }

    #[test]
    fn test_describe_deal_marks_inactive() {
        let mut deal = deal_fixture(3, DealType::FreeShipping, None, None);
        assert!(!describe_deal(&deal).contains("inactive"));
        deal.is_active = false;
        assert!(describe_deal(&deal).ends_with("· inactive"));
    }
}

//! Country business logic - reference data for stores and deals.
//!
//! Countries carry locale-keyed currency maps. [`localized`] reads one locale out of such
//! a map and [`currency_codes`] batches that lookup for the summary derivation.

use crate::{
    entities::{Country, country},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde_json::json;
use std::collections::HashMap;

/// Reads `locale` out of a locale-keyed JSON map.
///
/// Falls back to a `value` key, then to the map itself when it is a bare string.
#[must_use]
pub fn localized<'a>(map: &'a Json, locale: &str) -> Option<&'a str> {
    map.get(locale)
        .and_then(Json::as_str)
        .or_else(|| map.get("value").and_then(Json::as_str))
        .or_else(|| map.as_str())
        .filter(|s| !s.is_empty())
}

/// Retrieves all countries ordered by display name.
pub async fn get_all_countries(db: &DatabaseConnection) -> Result<Vec<country::Model>> {
    Country::find()
        .order_by_asc(country::Column::Value)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a country by its id.
pub async fn get_country_by_id<C>(conn: &C, country_id: i64) -> Result<Option<country::Model>>
where
    C: ConnectionTrait,
{
    Country::find_by_id(country_id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves a country by its ISO code, case-insensitively.
pub async fn get_country_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<country::Model>> {
    Country::find()
        .filter(country::Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::CountryNotFound`] unless `country_id` exists.
pub async fn ensure_country_exists<C>(conn: &C, country_id: i64) -> Result<country::Model>
where
    C: ConnectionTrait,
{
    get_country_by_id(conn, country_id)
        .await?
        .ok_or_else(|| Error::CountryNotFound {
            key: country_id.to_string(),
        })
}

/// Creates a country whose currency maps hold a single `locale` entry.
pub async fn create_country(
    db: &DatabaseConnection,
    value: String,
    code: String,
    currency: String,
    currency_code: String,
    locale: &str,
) -> Result<country::Model> {
    let value = crate::core::validate::title("value", &value)?;
    let code = code.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::validation("code", "must be a two-letter ISO country code"));
    }
    let currency_code = currency_code.trim().to_uppercase();
    if currency_code.len() != 3 || !currency_code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::validation(
            "currency_code",
            "must be a three-letter ISO currency code",
        ));
    }

    let country = country::ActiveModel {
        value: Set(value),
        code: Set(code),
        currency: Set(json!({ locale: currency.trim() })),
        currency_code: Set(json!({ locale: currency_code })),
        image_url: Set(None),
        ..Default::default()
    };
    country.insert(db).await.map_err(Into::into)
}

/// ISO currency code of one country in `locale`.
#[must_use]
pub fn currency_code_of(country: &country::Model, locale: &str) -> Option<String> {
    localized(&country.currency_code, locale).map(ToString::to_string)
}

/// Looks up the ISO currency codes of several countries in one query.
///
/// Countries without a code for `locale` are left out of the map.
pub async fn currency_codes<C, I>(conn: &C, country_ids: I, locale: &str) -> Result<HashMap<i64, String>>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let mut ids: Vec<i64> = country_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let countries = Country::find()
        .filter(country::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(countries
        .iter()
        .filter_map(|c| currency_code_of(c, locale).map(|code| (c.id, code)))
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_localized_lookup_order() {
        assert_eq!(localized(&json!({"en": "USD"}), "en"), Some("USD"));
        assert_eq!(localized(&json!({"value": "EUR"}), "en"), Some("EUR"));
        assert_eq!(localized(&json!("GBP"), "en"), Some("GBP"));
        assert_eq!(localized(&json!({"fr": "CAD"}), "en"), None);
        assert_eq!(localized(&json!({"en": ""}), "en"), None);
    }

    #[tokio::test]
    async fn test_create_country_normalises_codes() -> Result<()> {
        let db = setup_test_db().await?;
        let country = create_country(
            &db,
            "Canada".to_string(),
            "ca".to_string(),
            "$".to_string(),
            "cad".to_string(),
            "en",
        )
        .await?;

        assert_eq!(country.code, "CA");
        assert_eq!(currency_code_of(&country, "en").as_deref(), Some("CAD"));
        assert_eq!(localized(&country.currency, "en"), Some("$"));

        let found = get_country_by_code(&db, " ca ").await?.unwrap();
        assert_eq!(found.id, country.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_country_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_country(
            &db,
            "Nowhere".to_string(),
            "NWH".to_string(),
            "$".to_string(),
            "USD".to_string(),
            "en",
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { field: "code", .. })));

        let result = create_country(
            &db,
            "Nowhere".to_string(),
            "NW".to_string(),
            "$".to_string(),
            "DOLLARS".to_string(),
            "en",
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "currency_code",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_currency_codes_batch() -> Result<()> {
        let db = setup_test_db().await?;
        let us = create_test_country(&db, "US", "USD").await?;
        let ca = create_test_country(&db, "CA", "CAD").await?;

        let codes = currency_codes(&db, [us.id, ca.id, us.id, 999], "en").await?;
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[&us.id], "USD");
        assert_eq!(codes[&ca.id], "CAD");

        assert!(currency_codes(&db, Vec::new(), "en").await?.is_empty());
        assert!(get_all_countries(&db).await?.len() == 2);
        Ok(())
    }
}

//! Field validation and normalisation.
//!
//! These are the rules the admin forms enforced: slugs are `[a-z0-9-]+`, coupon codes
//! are `[A-Z0-9]+`, URLs are absolute http(s), and numeric discounts depend on the
//! deal type. Normalisers are applied before validators so that operator input like
//! `"Summer Sale"` for a slug or `"save-20"` for a code is accepted.

use crate::{
    entities::DealType,
    errors::{Error, Result},
};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("hard-coded pattern compiles")
}

static SLUG: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[a-z0-9-]+$"));
static CODE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z0-9]+$"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\+?[1-9][0-9]{0,15}$"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));
static WHITESPACE_OR_HYPHEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"[\s-]+"));

/// Unit stored on percentage deals.
pub const PERCENT_UNIT: &str = "%";
/// Unit stored on `amountOff` deals until a currency code replaces it.
pub const DOLLAR_UNIT: &str = "$";

/// Trims a required title, rejecting blank input.
pub fn title(field: &'static str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Strips whitespace and lowercases a slug, then checks it is `[a-z0-9-]+`.
pub fn slug(raw: &str) -> Result<String> {
    let normalised = WHITESPACE.replace_all(raw, "").to_lowercase();

    if normalised.is_empty() {
        return Err(Error::validation("slug", "cannot be empty"));
    }
    if !SLUG.is_match(&normalised) {
        return Err(Error::validation(
            "slug",
            "can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(normalised)
}

/// Strips whitespace and hyphens and uppercases a coupon code, then checks it is `[A-Z0-9]+`.
pub fn code(raw: &str) -> Result<String> {
    let normalised = WHITESPACE_OR_HYPHEN.replace_all(raw, "").to_uppercase();

    if normalised.is_empty() {
        return Err(Error::validation("code", "cannot be empty"));
    }
    if !CODE.is_match(&normalised) {
        return Err(Error::validation(
            "code",
            "can only contain uppercase letters and numbers",
        ));
    }
    Ok(normalised)
}

/// Checks an optional URL is absolute `http`/`https` with a non-empty host.
pub fn url(field: &'static str, raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .ok_or_else(|| Error::validation(field, "must start with http:// or https://"))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(Error::validation(field, "must include a host"));
    }
    Ok(Some(raw.to_string()))
}

/// Checks an optional phone number matches `^\+?[1-9]\d{0,15}$`.
pub fn phone(raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if !PHONE.is_match(raw) {
        return Err(Error::validation("phone", "please enter a valid phone number"));
    }
    Ok(Some(raw.to_string()))
}

/// Checks a category sort order is non-negative.
pub fn sort_order(value: i32) -> Result<i32> {
    if value < 0 {
        return Err(Error::validation("sort_order", "cannot be negative"));
    }
    Ok(value)
}

/// Normalises the numeric discount and unit of a deal for its type.
///
/// - `discount`: value must be within 1..=100, unit is always `%`.
/// - `amountOff`: value must be positive, unit defaults to `$`.
/// - `bogo` / `freeShipping`: both are dropped.
pub fn deal_discount(
    deal_type: DealType,
    discount: Option<f64>,
    unit: Option<&str>,
) -> Result<(Option<f64>, Option<String>)> {
    match deal_type {
        DealType::Discount => {
            let value = discount.ok_or_else(|| Error::validation("discount", "is required"))?;
            if !value.is_finite() || !(1.0..=100.0).contains(&value) {
                return Err(Error::validation(
                    "discount",
                    "discount must be between 1 and 100",
                ));
            }
            Ok((Some(value), Some(PERCENT_UNIT.to_string())))
        }
        DealType::AmountOff => {
            let value = discount.ok_or_else(|| Error::validation("discount", "is required"))?;
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::validation("discount", "amount must be positive"));
            }
            let unit = unit
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or(DOLLAR_UNIT);
            Ok((Some(value), Some(unit.to_string())))
        }
        DealType::Bogo | DealType::FreeShipping => Ok((None, None)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_slug_normalises_and_validates() {
        assert_eq!(slug("Summer Sale-2024").unwrap(), "summersale-2024");
        assert_eq!(slug("acme").unwrap(), "acme");
        assert!(matches!(
            slug("   ").unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));
        assert!(slug("acme_outdoors").is_err());
        assert!(slug("café").is_err());
        assert_eq!(slug("\tspring\n-sale ").unwrap(), "spring-sale");
    }

    #[test]
    fn test_code_normalises_and_validates() {
        assert_eq!(code("save-20 now").unwrap(), "SAVE20NOW");
        assert!(code("--").is_err());
        assert!(code("SAVE_20").is_err());
    }

    #[test]
    fn test_title_trims() {
        assert_eq!(title("title", "  Acme  ").unwrap(), "Acme");
        assert!(title("title", "\t").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert_eq!(url("url", None).unwrap(), None);
        assert_eq!(url("url", Some("  ")).unwrap(), None);
        assert_eq!(
            url("url", Some("https://acme.example/deals?x=1")).unwrap(),
            Some("https://acme.example/deals?x=1".to_string())
        );
        assert!(url("url", Some("ftp://acme.example")).is_err());
        assert!(url("url", Some("https:///path")).is_err());
        assert!(url("url", Some("acme.example")).is_err());
    }

    #[test]
    fn test_phone_validation() {
        assert_eq!(phone(Some("+15551234567")).unwrap().unwrap(), "+15551234567");
        assert_eq!(phone(None).unwrap(), None);
        assert!(phone(Some("0123")).is_err());
        assert!(phone(Some("+1 555 123")).is_err());
        assert!(phone(Some("12345678901234567")).is_err());
        assert!(phone(Some("+0")).is_err());
        assert!(phone(Some("١٢٣")).is_err());
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(sort_order(0).unwrap(), 0);
        assert!(sort_order(-1).is_err());
    }

    #[test]
    fn test_percentage_discount_bounds() {
        let (value, unit) = deal_discount(DealType::Discount, Some(15.0), Some("$")).unwrap();
        assert_eq!(value, Some(15.0));
        assert_eq!(unit.as_deref(), Some("%"));

        assert!(deal_discount(DealType::Discount, Some(0.0), None).is_err());
        assert!(deal_discount(DealType::Discount, Some(100.5), None).is_err());
        assert!(deal_discount(DealType::Discount, None, None).is_err());
        assert!(deal_discount(DealType::Discount, Some(f64::NAN), None).is_err());
    }

    #[test]
    fn test_amount_off_unit_defaults_to_dollar() {
        let (value, unit) = deal_discount(DealType::AmountOff, Some(25.0), None).unwrap();
        assert_eq!(value, Some(25.0));
        assert_eq!(unit.as_deref(), Some("$"));

        let (_, unit) = deal_discount(DealType::AmountOff, Some(5.0), Some("EUR")).unwrap();
        assert_eq!(unit.as_deref(), Some("EUR"));

        assert!(deal_discount(DealType::AmountOff, Some(0.0), None).is_err());
        assert!(deal_discount(DealType::AmountOff, Some(-3.0), None).is_err());
    }

    #[test]
    fn test_fallback_types_drop_discount() {
        assert_eq!(
            deal_discount(DealType::Bogo, Some(10.0), Some("%")).unwrap(),
            (None, None)
        );
        assert_eq!(
            deal_discount(DealType::FreeShipping, None, None).unwrap(),
            (None, None)
        );
    }
}

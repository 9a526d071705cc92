//! Application settings loading from config.toml
//!
//! `config.toml` holds the tunables of the summary rule and the reference data
//! (countries, categories) that is seeded into an empty database on start-up.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Settings {
    /// Store summary derivation settings
    #[serde(default)]
    pub summary: SummarySettings,
    /// Countries to seed
    #[serde(default)]
    pub countries: Vec<CountrySeed>,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// Tunables for [`crate::core::summary`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SummarySettings {
    /// Replace a literal `$` unit on the featured `amountOff` deal with the ISO
    /// currency code of the deal's country.
    #[serde(default = "default_true")]
    pub substitute_currency_code: bool,
    /// Locale key read from the country currency maps
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            substitute_currency_code: true,
            locale: default_locale(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "en".to_string()
}

/// A country to insert on first run
#[derive(Debug, Deserialize, Clone)]
pub struct CountrySeed {
    /// Display name
    pub value: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// Currency symbol or name in the configured locale
    pub currency: String,
    /// ISO 4217 currency code
    pub currency_code: String,
    /// Flag image URL
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A category to insert on first run
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Display name
    pub title: String,
    /// URL-safe identifier
    pub slug: String,
    /// Position in navigation
    #[serde(default)]
    pub sort_order: i32,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `DEALDESK_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: the defaults are used and nothing is seeded.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("DEALDESK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        tracing::warn!("No config file at {path}, using defaults");
        Ok(Settings::default())
    }
}

/// Database configuration and connection management
pub mod database;

/// Application settings and seed data loading from config.toml
pub mod settings;

/// Admin allow-list configuration from environment variables
pub mod admins;

pub use settings::{CategorySeed, CountrySeed, Settings, SummarySettings};
pub use admins::AdminList;

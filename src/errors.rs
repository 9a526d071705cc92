//! Unified error type for `DealDesk`.
//!
//! Every fallible operation in the crate returns [`Result`]. Database errors from
//! `SeaORM` and framework errors from serenity convert into [`Error`] through `From`
//! so that `?` works across the core and bot layers.

use thiserror::Error;

/// All errors that can be produced by the core and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// An error returned by the database driver or ORM.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A submitted field failed validation.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field (e.g. `"slug"`)
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// No store matched the given id or slug.
    #[error("Store not found: {key}")]
    StoreNotFound {
        /// Id or slug that was looked up
        key: String,
    },

    /// No deal matched the given id or slug.
    #[error("Deal not found: {key}")]
    DealNotFound {
        /// Id or slug that was looked up
        key: String,
    },

    /// No category matched the given id or slug.
    #[error("Category not found: {key}")]
    CategoryNotFound {
        /// Id or slug that was looked up
        key: String,
    },

    /// No country matched the given id or code.
    #[error("Country not found: {key}")]
    CountryNotFound {
        /// Id or code that was looked up
        key: String,
    },

    /// A slug is already taken by another row of the same table.
    #[error("A {entity} with slug '{slug}' already exists")]
    DuplicateSlug {
        /// Table the slug collided in (`"store"`, `"deal"`, `"category"`)
        entity: &'static str,
        /// The colliding slug
        slug: String,
    },

    /// The object storage collaborator rejected an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// Message reported by the storage backend
        message: String,
    },

    /// The caller is not on the admin allow-list.
    #[error("User {user_id} is not allowed to run admin commands")]
    Unauthorized {
        /// Discord user id of the caller
        user_id: String,
    },

    /// A required environment variable is missing or not unicode.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Filesystem error (config file, asset files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the Discord framework.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Builds a [`Error::Validation`] for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether this error is something the operator caused and can fix
    /// (bad input, unknown id), as opposed to an infrastructure failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::StoreNotFound { .. }
                | Self::DealNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::CountryNotFound { .. }
                | Self::DuplicateSlug { .. }
                | Self::Unauthorized { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = Error::validation("slug", "must not be empty");
        assert_eq!(err.to_string(), "Invalid slug: must not be empty");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_db_error_is_not_user_facing() {
        let err: Error = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, Error::Database(_)));
        assert!(!err.is_user_facing());
    }
}

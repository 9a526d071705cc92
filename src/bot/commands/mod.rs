//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Category management commands
pub mod category;

/// Deal management commands
pub mod deal;

/// General utility commands
pub mod general;

/// Parsing and formatting helpers for the commands
pub mod shared;

/// Store management commands
pub mod store;

// Export commands
pub use category::*;
pub use deal::*;
pub use general::*;
pub use store::*;

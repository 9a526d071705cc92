//! Core business logic - framework-agnostic store, deal, category and country operations.
//!
//! Every mutation that can change which deal a store features runs inside a single
//! database transaction together with [`summary::recompute_store_summary`].

/// Object naming and the object storage port
pub mod assets;
/// Category operations
pub mod category;
/// Deal ↔ category and store ↔ category link synchronization
pub mod category_links;
/// Country operations and currency lookups
pub mod country;
/// Deal operations
pub mod deal;
/// Seeding of reference data from settings
pub mod seed;
/// Store operations
pub mod store;
/// Best-deal derivation and store summary write-back
pub mod summary;
/// Field validation and normalisation shared by the operations
pub mod validate;

/// Page size used when a list query does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

/// A page of results together with the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Zero-based page index
    pub page: u64,
    /// Rows per page
    pub page_size: u64,
    /// Number of rows matching the filter across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

//! Store business logic - Handles all store-related operations.
//!
//! Stores are created and edited through [`StoreInput`]. The cached deal summary on a
//! store is never taken from input; it starts empty and is maintained by
//! [`crate::core::summary`]. Deleting a store removes its deals and category links in the
//! same transaction.

use crate::{
    config::SummarySettings,
    core::{
        Page, SortDirection,
        assets::{self, AssetPurpose, ObjectStorage},
        category_links, country, summary, validate,
    },
    entities::{Deal, DealCategory, Store, StoreCategory, deal, deal_category, store, store_category},
    errors::{Error, Result},
};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Fields an operator submits when creating or editing a store.
#[derive(Debug, Clone, Default)]
pub struct StoreInput {
    /// Display name
    pub title: String,
    /// URL-safe identifier; normalised before validation
    pub slug: String,
    /// Country the store operates in
    pub country_id: i64,
    /// Contact phone number
    pub phone: Option<String>,
    /// Store website
    pub website_url: Option<String>,
    /// Signed profile picture URL
    pub profile_picture_url: Option<String>,
    /// Signed cover URL
    pub cover_url: Option<String>,
    /// Whether the store is published
    pub is_active: bool,
    /// Categories the store belongs to; `None` leaves links untouched on update
    pub category_ids: Option<BTreeSet<i64>>,
}

/// Validated, normalised copy of [`StoreInput`] minus categories.
struct ValidStore {
    title: String,
    slug: String,
    phone: Option<String>,
    website_url: Option<String>,
    profile_picture_url: Option<String>,
    cover_url: Option<String>,
}

fn validate_input(input: &StoreInput) -> Result<ValidStore> {
    Ok(ValidStore {
        title: validate::title("title", &input.title)?,
        slug: validate::slug(&input.slug)?,
        phone: validate::phone(input.phone.as_deref())?,
        website_url: validate::url("website_url", input.website_url.as_deref())?,
        profile_picture_url: validate::url(
            "profile_picture_url",
            input.profile_picture_url.as_deref(),
        )?,
        cover_url: validate::url("cover_url", input.cover_url.as_deref())?,
    })
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Store::find().filter(store::Column::Slug.eq(slug));
    if let Some(id) = except_id {
        query = query.filter(store::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(Error::DuplicateSlug {
            entity: "store",
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Retrieves a store by its id.
pub async fn get_store_by_id<C>(conn: &C, store_id: i64) -> Result<Option<store::Model>>
where
    C: ConnectionTrait,
{
    Store::find_by_id(store_id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves a store by its slug.
pub async fn get_store_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<store::Model>> {
    Store::find()
        .filter(store::Column::Slug.eq(slug.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a store with an empty deal summary.
///
/// # Errors
/// Returns a validation error for bad fields, [`Error::DuplicateSlug`],
/// [`Error::CountryNotFound`], [`Error::CategoryNotFound`], or a database error.
#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn create_store(db: &DatabaseConnection, input: StoreInput) -> Result<store::Model> {
    let valid = validate_input(&input)?;

    let txn = db.begin().await?;
    country::ensure_country_exists(&txn, input.country_id).await?;
    ensure_slug_free(&txn, &valid.slug, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let store = store::ActiveModel {
        title: Set(valid.title),
        slug: Set(valid.slug),
        country_id: Set(input.country_id),
        phone: Set(valid.phone),
        website_url: Set(valid.website_url),
        profile_picture_url: Set(valid.profile_picture_url),
        cover_url: Set(valid.cover_url),
        is_active: Set(input.is_active),
        total_offers: Set(0),
        discount: Set(None),
        discount_unit: Set(None),
        discount_type: Set(None),
        discount_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(category_ids) = &input.category_ids {
        category_links::sync_store_categories(&txn, store.id, category_ids).await?;
    }

    txn.commit().await?;
    info!("Created store {} ({})", store.id, store.slug);
    Ok(store)
}

/// Updates a store's own fields and, when given, its categories.
///
/// Changing the store's country changes the fallback currency of its featured deal, so
/// the summary is recomputed in the same transaction.
///
/// # Errors
/// Returns an error if:
/// - Any field fails validation
/// - The store or the country doesn't exist
/// - Another store already uses the slug
/// - A requested category doesn't exist
/// - A database operation fails (nothing is written in that case)
#[instrument(skip(db, settings, input), fields(slug = %input.slug))]
pub async fn update_store(
    db: &DatabaseConnection,
    settings: &SummarySettings,
    store_id: i64,
    input: StoreInput,
) -> Result<store::Model> {
    let valid = validate_input(&input)?;

    let txn = db.begin().await?;
    let existing = Store::find_by_id(store_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;
    country::ensure_country_exists(&txn, input.country_id).await?;
    ensure_slug_free(&txn, &valid.slug, Some(store_id)).await?;

    let country_changed = existing.country_id != input.country_id;
    let mut store: store::ActiveModel = existing.into();
    store.title = Set(valid.title);
    store.slug = Set(valid.slug);
    store.country_id = Set(input.country_id);
    store.phone = Set(valid.phone);
    store.website_url = Set(valid.website_url);
    store.profile_picture_url = Set(valid.profile_picture_url);
    store.cover_url = Set(valid.cover_url);
    store.is_active = Set(input.is_active);
    store.updated_at = Set(chrono::Utc::now().naive_utc());
    let mut updated = store.update(&txn).await?;

    if let Some(category_ids) = &input.category_ids {
        category_links::sync_store_categories(&txn, store_id, category_ids).await?;
    }
    if country_changed {
        updated = summary::recompute_store_summary(&txn, store_id, settings).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Replaces the store's categories.
///
/// # Errors
/// Returns an error if:
/// - The store doesn't exist
/// - Any of `category_ids` doesn't exist (no links change)
/// - A database operation fails
pub async fn set_store_categories(
    db: &DatabaseConnection,
    store_id: i64,
    category_ids: &BTreeSet<i64>,
) -> Result<category_links::CategoryDiff> {
    let txn = db.begin().await?;
    get_store_by_id(&txn, store_id)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;
    let diff = category_links::sync_store_categories(&txn, store_id, category_ids).await?;
    txn.commit().await?;
    Ok(diff)
}

/// Uploads a profile picture or cover for a store and stores its signed URL.
///
/// The image the row currently points at is removed first, so an upload with another
/// extension or after a slug change does not leave the old object behind.
///
/// # Errors
/// - [`Error::Validation`] if `purpose` is a category image or the file is unusable
/// - [`Error::StoreNotFound`] if the store doesn't exist
/// - [`Error::Storage`] or a database error otherwise
#[instrument(skip(db, storage, bytes))]
pub async fn set_store_image<S>(
    db: &DatabaseConnection,
    storage: &S,
    store_id: i64,
    purpose: AssetPurpose,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<store::Model>
where
    S: ObjectStorage,
{
    if purpose == AssetPurpose::CategoryImage {
        return Err(Error::validation("purpose", "stores take a profile picture or cover"));
    }
    let existing = get_store_by_id(db, store_id)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;

    let current = match purpose {
        AssetPurpose::Cover => existing.cover_url.as_deref(),
        _ => existing.profile_picture_url.as_deref(),
    };
    if let Some(url) = current {
        assets::remove_asset_by_url(storage, url, purpose).await?;
    }
    let url = assets::upload_asset(storage, &existing.slug, purpose, file_name, bytes).await?;

    let mut store: store::ActiveModel = existing.into();
    match purpose {
        AssetPurpose::Cover => store.cover_url = Set(Some(url)),
        _ => store.profile_picture_url = Set(Some(url)),
    }
    store.updated_at = Set(chrono::Utc::now().naive_utc());
    store.update(db).await.map_err(Into::into)
}

/// Deletes a store together with its deals and all their category links.
///
/// Returns the deleted store.
///
/// # Errors
/// Returns an error if:
/// - The store doesn't exist
/// - A database operation fails
#[instrument(skip(db))]
pub async fn delete_store(db: &DatabaseConnection, store_id: i64) -> Result<store::Model> {
    let txn = db.begin().await?;
    let store = Store::find_by_id(store_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;

    let deal_ids: Vec<i64> = Deal::find()
        .select_only()
        .column(deal::Column::Id)
        .filter(deal::Column::StoreId.eq(store_id))
        .into_tuple::<i64>()
        .all(&txn)
        .await?;

    if !deal_ids.is_empty() {
        DealCategory::delete_many()
            .filter(deal_category::Column::DealId.is_in(deal_ids.iter().copied()))
            .exec(&txn)
            .await?;
        Deal::delete_many()
            .filter(deal::Column::StoreId.eq(store_id))
            .exec(&txn)
            .await?;
    }
    StoreCategory::delete_many()
        .filter(store_category::Column::StoreId.eq(store_id))
        .exec(&txn)
        .await?;
    Store::delete_by_id(store_id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted store {} ({}) with {} deals",
        store.id,
        store.slug,
        deal_ids.len()
    );
    Ok(store)
}

/// Column a store list can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreSort {
    /// Alphabetical by title
    #[default]
    Title,
    /// By number of deals
    TotalOffers,
    /// By featured discount value
    Discount,
    /// Newest or oldest first
    CreatedAt,
}

/// Filters for [`list_stores`].
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    /// Only stores in this country
    pub country_id: Option<i64>,
    /// Only active (`true`) or inactive (`false`) stores
    pub is_active: Option<bool>,
    /// Case-insensitive substring of title or slug
    pub search: Option<String>,
    /// Sort column
    pub sort: StoreSort,
    /// Sort direction
    pub direction: SortDirection,
}

/// Lists stores matching `filter`, one page at a time.
///
/// `page` is zero-based; a `page_size` of 0 uses [`crate::core::DEFAULT_PAGE_SIZE`].
///
/// # Errors
/// Returns an error if the count or page query fails.
pub async fn list_stores(
    db: &DatabaseConnection,
    filter: &StoreFilter,
    page: u64,
    page_size: u64,
) -> Result<Page<store::Model>> {
    let mut condition = Condition::all();
    if let Some(country_id) = filter.country_id {
        condition = condition.add(store::Column::CountryId.eq(country_id));
    }
    if let Some(is_active) = filter.is_active {
        condition = condition.add(store::Column::IsActive.eq(is_active));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(store::Column::Title.contains(search))
                .add(store::Column::Slug.contains(search.to_lowercase())),
        );
    }

    let column = match filter.sort {
        StoreSort::Title => store::Column::Title,
        StoreSort::TotalOffers => store::Column::TotalOffers,
        StoreSort::Discount => store::Column::Discount,
        StoreSort::CreatedAt => store::Column::CreatedAt,
    };
    let query = Store::find().filter(condition);
    let query = match filter.direction {
        SortDirection::Asc => query.order_by_asc(column),
        SortDirection::Desc => query.order_by_desc(column),
    }
    .order_by_asc(store::Column::Id);

    let page_size = if page_size == 0 {
        crate::core::DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let paginator = query.paginate(db, page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page).await?;

    Ok(Page {
        items,
        page,
        page_size,
        total,
    })
}

//! Deal business logic - Handles all deal-related operations.
//!
//! Creating, editing, and deleting a deal changes which deal its store should feature.
//! Each of these operations therefore runs in one database transaction that also
//! rewrites the owning store's summary through
//! [`summary::recompute_store_summary`]. Either the deal change and the summary commit
//! together, or neither does.

use crate::{
    config::SummarySettings,
    core::{Page, SortDirection, category_links, country, store as store_ops, summary, validate},
    entities::{Deal, DealCategory, DealType, deal, deal_category},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Fields an operator submits when creating or editing a deal.
///
/// Grouping the arguments keeps the create and update signatures manageable.
#[derive(Debug, Clone)]
pub struct DealInput {
    /// Headline
    pub title: String,
    /// URL-safe identifier; normalised before validation
    pub slug: String,
    /// Coupon code; normalised before validation
    pub code: String,
    /// Long description
    pub description: Option<String>,
    /// Owning store
    pub store_id: i64,
    /// Country the deal is valid in
    pub country_id: i64,
    /// Kind of offer
    pub deal_type: DealType,
    /// Numeric discount (required for `discount`/`amountOff`, ignored otherwise)
    pub discount: Option<f64>,
    /// Unit for `amountOff`; `%` is forced for `discount`
    pub discount_unit: Option<String>,
    /// Landing page
    pub url: Option<String>,
    /// Whether the deal is published
    pub is_active: bool,
    /// When the deal stops being valid
    pub expiry_date: DateTime<Utc>,
    /// Categories of the deal; `None` leaves links untouched on update
    pub category_ids: Option<BTreeSet<i64>>,
}

/// Outcome of a deal mutation: the deal and the refreshed store summary.
#[derive(Debug, Clone)]
pub struct DealChange {
    /// The deal after the change (before deletion, for deletes)
    pub deal: deal::Model,
    /// The owning store after its summary was recomputed
    pub store: crate::entities::store::Model,
    /// The previous owner, when the deal moved between stores
    pub previous_store: Option<crate::entities::store::Model>,
}

struct ValidDeal {
    title: String,
    slug: String,
    code: String,
    description: Option<String>,
    discount: Option<f64>,
    discount_unit: Option<String>,
    url: Option<String>,
}

fn validate_input(input: &DealInput) -> Result<ValidDeal> {
    let (discount, discount_unit) = validate::deal_discount(
        input.deal_type,
        input.discount,
        input.discount_unit.as_deref(),
    )?;
    Ok(ValidDeal {
        title: validate::title("title", &input.title)?,
        slug: validate::slug(&input.slug)?,
        code: validate::code(&input.code)?,
        description: input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToString::to_string),
        discount,
        discount_unit,
        url: validate::url("url", input.url.as_deref())?,
    })
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Deal::find().filter(deal::Column::Slug.eq(slug));
    if let Some(id) = except_id {
        query = query.filter(deal::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(Error::DuplicateSlug {
            entity: "deal",
            slug: slug.to_string(),
        });
    }
    Ok(())
}

async fn ensure_store_exists<C>(conn: &C, store_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    store_ops::get_store_by_id(conn, store_id)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;
    Ok(())
}

/// Retrieves a deal by its id.
pub async fn get_deal_by_id<C>(conn: &C, deal_id: i64) -> Result<Option<deal::Model>>
where
    C: ConnectionTrait,
{
    Deal::find_by_id(deal_id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves a deal by its slug.
pub async fn get_deal_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<deal::Model>> {
    Deal::find()
        .filter(deal::Column::Slug.eq(slug.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all deals of a store in id order.
pub async fn get_deals_for_store(
    db: &DatabaseConnection,
    store_id: i64,
) -> Result<Vec<deal::Model>> {
    Deal::find()
        .filter(deal::Column::StoreId.eq(store_id))
        .order_by_asc(deal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a deal and refreshes its store's summary in one transaction.
///
/// # Errors
/// Returns a validation error for bad fields, [`Error::DuplicateSlug`],
/// [`Error::StoreNotFound`], [`Error::CountryNotFound`], [`Error::CategoryNotFound`],
/// or a database error. Nothing is written when any step fails.
#[instrument(skip(db, settings, input), fields(slug = %input.slug, store_id = input.store_id))]
pub async fn create_deal(
    db: &DatabaseConnection,
    settings: &SummarySettings,
    input: DealInput,
) -> Result<DealChange> {
    let valid = validate_input(&input)?;

    let txn = db.begin().await?;
    ensure_store_exists(&txn, input.store_id).await?;
    country::ensure_country_exists(&txn, input.country_id).await?;
    ensure_slug_free(&txn, &valid.slug, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let deal = deal::ActiveModel {
        title: Set(valid.title),
        slug: Set(valid.slug),
        code: Set(valid.code),
        description: Set(valid.description),
        store_id: Set(input.store_id),
        country_id: Set(input.country_id),
        deal_type: Set(input.deal_type),
        discount: Set(valid.discount),
        discount_unit: Set(valid.discount_unit),
        url: Set(valid.url),
        is_active: Set(input.is_active),
        expiry_date: Set(input.expiry_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(category_ids) = &input.category_ids {
        category_links::sync_deal_categories(&txn, deal.id, category_ids).await?;
    }
    let store = summary::recompute_store_summary(&txn, input.store_id, settings).await?;

    txn.commit().await?;
    info!("Created deal {} ({}) for store {}", deal.id, deal.slug, store.id);
    Ok(DealChange {
        deal,
        store,
        previous_store: None,
    })
}

/// Replaces a deal's fields and refreshes the summary of its store.
///
/// When the deal moves to a different store, both the old and the new store are
/// recomputed in the same transaction.
///
/// # Errors
/// Returns an error if:
/// - Any field fails validation
/// - The deal, the target store or the country doesn't exist
/// - Another deal already uses the slug
/// - A requested category doesn't exist
/// - A database operation fails (nothing is written in that case)
#[instrument(skip(db, settings, input), fields(slug = %input.slug))]
pub async fn update_deal(
    db: &DatabaseConnection,
    settings: &SummarySettings,
    deal_id: i64,
    input: DealInput,
) -> Result<DealChange> {
    let valid = validate_input(&input)?;

    let txn = db.begin().await?;
    let existing = get_deal_by_id(&txn, deal_id)
        .await?
        .ok_or_else(|| Error::DealNotFound {
            key: deal_id.to_string(),
        })?;
    ensure_store_exists(&txn, input.store_id).await?;
    country::ensure_country_exists(&txn, input.country_id).await?;
    ensure_slug_free(&txn, &valid.slug, Some(deal_id)).await?;

    let old_store_id = existing.store_id;
    let mut deal: deal::ActiveModel = existing.into();
    deal.title = Set(valid.title);
    deal.slug = Set(valid.slug);
    deal.code = Set(valid.code);
    deal.description = Set(valid.description);
    deal.store_id = Set(input.store_id);
    deal.country_id = Set(input.country_id);
    deal.deal_type = Set(input.deal_type);
    deal.discount = Set(valid.discount);
    deal.discount_unit = Set(valid.discount_unit);
    deal.url = Set(valid.url);
    deal.is_active = Set(input.is_active);
    deal.expiry_date = Set(input.expiry_date);
    deal.updated_at = Set(chrono::Utc::now().naive_utc());
    let deal = deal.update(&txn).await?;

    if let Some(category_ids) = &input.category_ids {
        category_links::sync_deal_categories(&txn, deal_id, category_ids).await?;
    }

    let previous_store = if old_store_id == input.store_id {
        None
    } else {
        info!(
            "Deal {} moved from store {} to store {}",
            deal_id, old_store_id, input.store_id
        );
        Some(summary::recompute_store_summary(&txn, old_store_id, settings).await?)
    };
    let store = summary::recompute_store_summary(&txn, input.store_id, settings).await?;

    txn.commit().await?;
    Ok(DealChange {
        deal,
        store,
        previous_store,
    })
}

/// Replaces a deal's categories.
///
/// # Errors
/// Returns an error if:
/// - The deal doesn't exist
/// - Any of `category_ids` doesn't exist (no links change)
/// - A database operation fails
pub async fn set_deal_categories(
    db: &DatabaseConnection,
    deal_id: i64,
    category_ids: &BTreeSet<i64>,
) -> Result<category_links::CategoryDiff> {
    let txn = db.begin().await?;
    get_deal_by_id(&txn, deal_id)
        .await?
        .ok_or_else(|| Error::DealNotFound {
            key: deal_id.to_string(),
        })?;
    let diff = category_links::sync_deal_categories(&txn, deal_id, category_ids).await?;
    txn.commit().await?;
    Ok(diff)
}

/// Deletes a deal and its category links, then refreshes its store's summary.
///
/// If the deal was the featured one, the next best deal takes its place.
///
/// # Errors
/// Returns an error if:
/// - The deal doesn't exist
/// - A database operation fails
#[instrument(skip(db, settings))]
pub async fn delete_deal(
    db: &DatabaseConnection,
    settings: &SummarySettings,
    deal_id: i64,
) -> Result<DealChange> {
    let txn = db.begin().await?;
    let deal = get_deal_by_id(&txn, deal_id)
        .await?
        .ok_or_else(|| Error::DealNotFound {
            key: deal_id.to_string(),
        })?;

    DealCategory::delete_many()
        .filter(deal_category::Column::DealId.eq(deal_id))
        .exec(&txn)
        .await?;
    Deal::delete_by_id(deal_id).exec(&txn).await?;
    let store = summary::recompute_store_summary(&txn, deal.store_id, settings).await?;

    txn.commit().await?;
    info!("Deleted deal {} ({})", deal.id, deal.slug);
    Ok(DealChange {
        deal,
        store,
        previous_store: None,
    })
}

/// Column a deal list can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DealSort {
    /// By expiry date
    #[default]
    ExpiryDate,
    /// By numeric discount
    Discount,
    /// Alphabetical by title
    Title,
    /// By creation time
    CreatedAt,
}

/// Filters for [`list_deals`].
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    /// Only deals of this store
    pub store_id: Option<i64>,
    /// Only deals valid in this country
    pub country_id: Option<i64>,
    /// Only deals of this type
    pub deal_type: Option<DealType>,
    /// Only active (`true`) or inactive (`false`) deals
    pub is_active: Option<bool>,
    /// Case-insensitive substring of title, slug or code
    pub search: Option<String>,
    /// Sort column
    pub sort: DealSort,
    /// Sort direction
    pub direction: SortDirection,
}

/// Lists deals matching `filter`, one page at a time.
///
/// `page` is zero-based; a `page_size` of 0 uses [`crate::core::DEFAULT_PAGE_SIZE`].
///
/// # Errors
/// Returns an error if the count or page query fails.
pub async fn list_deals(
    db: &DatabaseConnection,
    filter: &DealFilter,
    page: u64,
    page_size: u64,
) -> Result<Page<deal::Model>> {
    let mut condition = Condition::all();
    if let Some(store_id) = filter.store_id {
        condition = condition.add(deal::Column::StoreId.eq(store_id));
    }
    if let Some(country_id) = filter.country_id {
        condition = condition.add(deal::Column::CountryId.eq(country_id));
    }
    if let Some(deal_type) = filter.deal_type {
        condition = condition.add(deal::Column::DealType.eq(deal_type));
    }
    if let Some(is_active) = filter.is_active {
        condition = condition.add(deal::Column::IsActive.eq(is_active));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(deal::Column::Title.contains(search))
                .add(deal::Column::Slug.contains(search.to_lowercase()))
                .add(deal::Column::Code.contains(search.to_uppercase())),
        );
    }

    let column = match filter.sort {
        DealSort::ExpiryDate => deal::Column::ExpiryDate,
        DealSort::Discount => deal::Column::Discount,
        DealSort::Title => deal::Column::Title,
        DealSort::CreatedAt => deal::Column::CreatedAt,
    };
    let query = Deal::find().filter(condition);
    let query = match filter.direction {
        SortDirection::Asc => query.order_by_asc(column),
        SortDirection::Desc => query.order_by_desc(column),
    }
    .order_by_asc(deal::Column::Id);

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

/// Active deals whose expiry date is before `now`, oldest first.
pub async fn get_expired_active_deals(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<deal::Model>> {
    Deal::find()
        .filter(deal::Column::IsActive.eq(true))
        .filter(deal::Column::ExpiryDate.lt(now))
        .order_by_asc(deal::Column::ExpiryDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks every expired active deal inactive, returning how many were changed.
///
/// Inactive deals still count toward their store's offers, so summaries are untouched.
pub async fn deactivate_expired_deals(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64> {
    let result = Deal::update_many()
        .col_expr(deal::Column::IsActive, Expr::value(false))
        .col_expr(deal::Column::UpdatedAt, Expr::value(now.naive_utc()))
        .filter(deal::Column::IsActive.eq(true))
        .filter(deal::Column::ExpiryDate.lt(now))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        warn!("Deactivated {} expired deals", result.rows_affected);
    }
    Ok(result.rows_affected)
}

/// Number of deals per store id, for reports.
pub async fn count_deals_by_store(db: &DatabaseConnection) -> Result<Vec<(i64, i64)>> {
    Deal::find()
        .select_only()
        .column(deal::Column::StoreId)
        .column_as(Expr::col(deal::Column::Id).count(), "deal_count")
        .group_by(deal::Column::StoreId)
        .order_by_asc(deal::Column::StoreId)
        .into_tuple::<(i64, i64)>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::store::get_store_by_id,
        entities::{DealType, Store},
        test_utils::*,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_deal_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let settings = SummarySettings::default();

        let mut input = deal_input_for(1, 1, "d", DealType::Discount, Some(150.0));
        let result = create_deal(&db, &settings, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation { field: "discount", .. })));

        input.discount = Some(10.0);
        input.code = "save_10".to_string();
        let result = create_deal(&db, &settings, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation { field: "code", .. })));

        input.code = "SAVE10".to_string();
        input.url = Some("not a url".to_string());
        let result = create_deal(&db, &settings, input).await;
        assert!(matches!(result, Err(Error::Validation { field: "url", .. })));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_leave_consistent_summary() -> Result<()> {
        const DEALS: i32 = 8;
        let (db, path) = setup_file_test_db("concurrent-creates").await?;
        let settings = SummarySettings::default();
        let country = create_test_country(&db, "US", "USD").await?;
        let store = create_test_store(&db, "busy-store", country.id).await?;

        let db = std::sync::Arc::new(db);
        let mut tasks = Vec::new();
        for i in 1..=DEALS {
            let db = std::sync::Arc::clone(&db);
            let settings = settings.clone();
            let input = deal_input_for(
                store.id,
                country.id,
                &format!("deal-{i}"),
                DealType::Discount,
                Some(f64::from(i)),
            );
            tasks.push(tokio::spawn(async move {
                create_deal(&db, &settings, input).await
            }));
        }
        let mut created = Vec::new();
        for task in tasks {
            created.push(task.await.unwrap()?.deal);
        }
        let db = std::sync::Arc::try_unwrap(db).ok().unwrap();

        let store = get_store_by_id(&db, store.id).await?.unwrap();
        let best = created
            .iter()
            .find(|d| d.discount == Some(f64::from(DEALS)))
            .unwrap();
        assert_eq!(store.total_offers, DEALS);
        assert_eq!(store.discount_id, Some(best.id));
        assert_eq!(store.discount, Some(f64::from(DEALS)));
        assert_eq!(
            get_deals_for_store(&db, store.id).await?.len(),
            usize::try_from(DEALS).unwrap()
        );

        db.close().await?;
        std::fs::remove_file(&path).ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_update_deal_clears_optional_fields() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let mut input = deal_input(&store, "landing", DealType::Bogo, None);
        input.url = Some("https://acme.example/landing".to_string());
        input.description = Some("Two for one".to_string());
        let created = create_deal(&db, &settings, input.clone()).await?.deal;
        assert!(created.url.is_some());

        input.url = None;
        input.description = None;
        let updated = update_deal(&db, &settings, created.id, input).await?.deal;
        assert!(updated.url.is_none());
        assert!(updated.description.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_example_from_two_ranked_deals() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let settings = SummarySettings {
            substitute_currency_code: false,
            ..settings
        };

        let first = create_deal(
            &db,
            &settings,
            deal_input(&store, "ten", DealType::Discount, Some(10.0)),
        )
        .await?;
        assert_eq!(first.store.discount_id, Some(first.deal.id));

        let second = create_deal(
            &db,
            &settings,
            deal_input(&store, "twenty-five", DealType::AmountOff, Some(25.0)),
        )
        .await?;

        assert_eq!(second.store.discount_id, Some(second.deal.id));
        assert_eq!(second.store.discount, Some(25.0));
        assert_eq!(second.store.discount_type, Some(DealType::AmountOff));
        assert_eq!(second.store.discount_unit.as_deref(), Some("$"));
        assert_eq!(second.store.total_offers, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_bogo_only_store() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let change =
            create_deal(&db, &settings, deal_input(&store, "bogo", DealType::Bogo, Some(50.0)))
                .await?;

        assert!(change.deal.discount.is_none());
        assert!(change.deal.discount_unit.is_none());
        assert_eq!(change.store.discount, Some(0.0));
        assert_eq!(change.store.discount_unit.as_deref(), Some(""));
        assert_eq!(change.store.discount_type, Some(DealType::Bogo));
        assert_eq!(change.store.discount_id, Some(change.deal.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_featured_deal_promotes_next_best() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let small =
            create_test_deal(&db, &settings, store.id, "small", DealType::Discount, Some(5.0))
                .await?;
        let big = create_test_deal(&db, &settings, store.id, "big", DealType::Discount, Some(50.0))
            .await?;

        let change = delete_deal(&db, &settings, big.id).await?;
        assert_eq!(change.deal.id, big.id);
        assert_eq!(change.store.discount_id, Some(small.id));
        assert_eq!(change.store.discount, Some(5.0));
        assert_eq!(change.store.total_offers, 1);

        let change = delete_deal(&db, &settings, small.id).await?;
        assert_eq!(change.store.total_offers, 0);
        assert!(change.store.discount_id.is_none());
        assert!(change.store.discount.is_none());
        assert!(change.store.discount_unit.is_none());
        assert!(change.store.discount_type.is_none());

        let result = delete_deal(&db, &settings, small.id).await;
        assert!(matches!(result, Err(Error::DealNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_deal_recomputes_store() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let a = create_test_deal(&db, &settings, store.id, "a", DealType::Discount, Some(30.0))
            .await?;
        let b = create_test_deal(&db, &settings, store.id, "b", DealType::Discount, Some(10.0))
            .await?;

        let change = update_deal(
            &db,
            &settings,
            b.id,
            deal_input(&store, "b", DealType::Discount, Some(60.0)),
        )
        .await?;
        assert_eq!(change.store.discount_id, Some(b.id));
        assert_eq!(change.store.discount, Some(60.0));
        assert!(change.previous_store.is_none());

        // Switching the winner to a fallback type hands the spot back to `a`
        let change = update_deal(
            &db,
            &settings,
            b.id,
            deal_input(&store, "b", DealType::FreeShipping, None),
        )
        .await?;
        assert_eq!(change.store.discount_id, Some(a.id));
        assert!(change.deal.discount.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_moving_deal_recomputes_both_stores() -> Result<()> {
        let (db, settings, country, store) = setup_with_store().await?;
        let other = create_test_store(&db, "other", country.id).await?;
        let deal =
            create_test_deal(&db, &settings, store.id, "mover", DealType::Discount, Some(20.0))
                .await?;

        let change =
            update_deal(&db, &settings, deal.id, deal_input(&other, "mover", DealType::Discount, Some(20.0)))
                .await?;

        let previous = change.previous_store.unwrap();
        assert_eq!(previous.id, store.id);
        assert_eq!(previous.total_offers, 0);
        assert!(previous.discount_id.is_none());
        assert_eq!(change.store.id, other.id);
        assert_eq!(change.store.discount_id, Some(deal.id));
        assert_eq!(change.store.total_offers, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_create_leaves_store_untouched() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let mut input = deal_input(&store, "orphan", DealType::Discount, Some(90.0));
        input.category_ids = Some([404].into_iter().collect());

        let result = create_deal(&db, &settings, input).await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));

        // The insert was rolled back together with the failed link step
        assert!(get_deal_by_slug(&db, "orphan").await?.is_none());
        let unchanged = get_store_by_id(&db, store.id).await?.unwrap();
        assert_eq!(unchanged.total_offers, 0);
        assert!(unchanged.discount_id.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_slug_and_missing_store() -> Result<()> {
        let (db, settings, country, store) = setup_with_store().await?;
        create_test_deal(&db, &settings, store.id, "taken", DealType::Bogo, None).await?;

        let result =
            create_deal(&db, &settings, deal_input(&store, "taken", DealType::Bogo, None)).await;
        assert!(matches!(result, Err(Error::DuplicateSlug { entity: "deal", .. })));

        let result = create_deal(
            &db,
            &settings,
            deal_input_for(999, country.id, "lost", DealType::Bogo, None),
        )
        .await;
        assert!(matches!(result, Err(Error::StoreNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_deals_filters() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        create_test_deal(&db, &settings, store.id, "pct-small", DealType::Discount, Some(5.0))
            .await?;
        create_test_deal(&db, &settings, store.id, "pct-big", DealType::Discount, Some(45.0))
            .await?;
        create_test_deal(&db, &settings, store.id, "ship", DealType::FreeShipping, None).await?;

        let filter = DealFilter {
            deal_type: Some(DealType::Discount),
            sort: DealSort::Discount,
            direction: SortDirection::Desc,
            ..DealFilter::default()
        };
        let page = list_deals(&db, &filter, 0, 10).await?;
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].slug, "pct-big");

        let filter = DealFilter {
            search: Some("SHIP".to_string()),
            ..DealFilter::default()
        };
        let page = list_deals(&db, &filter, 0, 10).await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].deal_type, DealType::FreeShipping);

        assert_eq!(count_deals_by_store(&db).await?, vec![(store.id, 3)]);
        assert_eq!(get_deals_for_store(&db, store.id).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_deals_are_deactivated_without_touching_summary() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let mut input = deal_input(&store, "old", DealType::Discount, Some(15.0));
        input.expiry_date = chrono::Utc::now() - chrono::Duration::days(2);
        let old = create_deal(&db, &settings, input).await?.deal;
        create_test_deal(&db, &settings, store.id, "fresh", DealType::Bogo, None).await?;

        let now = chrono::Utc::now();
        let expired = get_expired_active_deals(&db, now).await?;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);

        assert_eq!(deactivate_expired_deals(&db, now).await?, 1);
        assert_eq!(deactivate_expired_deals(&db, now).await?, 0);
        assert!(!get_deal_by_id(&db, old.id).await?.unwrap().is_active);

        let store = Store::find_by_id(store.id).one(&db).await?.unwrap();
        assert_eq!(store.total_offers, 2);
        assert_eq!(store.discount_id, Some(old.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_deal_categories() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let deal =
            create_test_deal(&db, &settings, store.id, "cats", DealType::Bogo, None).await?;
        let food = create_test_category(&db, "food").await?;

        let diff = set_deal_categories(&db, deal.id, &[food.id].into_iter().collect()).await?;
        assert_eq!(diff.to_add.len(), 1);

        let result = set_deal_categories(&db, 999, &BTreeSet::new()).await;
        assert!(matches!(result, Err(Error::DealNotFound { .. })));
        Ok(())
    }
}

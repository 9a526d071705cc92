//! Category link synchronization for deals and stores.
//!
//! The operator submits the full set of categories an entity should belong to. The
//! persisted set is read, [`diff_category_ids`] computes what to delete and what to
//! insert, and at most one DELETE and one INSERT are issued. Running the same sync twice
//! writes nothing the second time.

use crate::{
    entities::{Category, DealCategory, StoreCategory, category, deal_category, store_category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::BTreeSet;
use tracing::debug;

/// Writes needed to move a persisted id set to a desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDiff {
    /// Ids that are desired but not persisted
    pub to_add: BTreeSet<i64>,
    /// Ids that are persisted but no longer desired
    pub to_remove: BTreeSet<i64>,
}

impl CategoryDiff {
    /// True when nothing needs to be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Computes `desired − initial` and `initial − desired`.
#[must_use]
pub fn diff_category_ids(initial: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> CategoryDiff {
    CategoryDiff {
        to_add: desired.difference(initial).copied().collect(),
        to_remove: initial.difference(desired).copied().collect(),
    }
}

/// Fails with [`Error::CategoryNotFound`] naming the first id that does not exist.
pub async fn ensure_categories_exist<C>(conn: &C, ids: &BTreeSet<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<i64> = Category::find()
        .select_only()
        .column(category::Column::Id)
        .filter(category::Column::Id.is_in(ids.iter().copied()))
        .into_tuple::<i64>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    match ids.difference(&found).next() {
        Some(missing) => Err(Error::CategoryNotFound {
            key: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Category ids currently linked to a deal.
pub async fn deal_category_ids<C>(conn: &C, deal_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    Ok(DealCategory::find()
        .filter(deal_category::Column::DealId.eq(deal_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.category_id)
        .collect())
}

/// Category ids currently linked to a store.
pub async fn store_category_ids<C>(conn: &C, store_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    Ok(StoreCategory::find()
        .filter(store_category::Column::StoreId.eq(store_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.category_id)
        .collect())
}

/// Makes the deal's categories equal to `desired`, returning the writes performed.
pub async fn sync_deal_categories<C>(
    conn: &C,
    deal_id: i64,
    desired: &BTreeSet<i64>,
) -> Result<CategoryDiff>
where
    C: ConnectionTrait,
{
    ensure_categories_exist(conn, desired).await?;
    let initial = deal_category_ids(conn, deal_id).await?;
    let diff = diff_category_ids(&initial, desired);

    if !diff.to_remove.is_empty() {
        DealCategory::delete_many()
            .filter(deal_category::Column::DealId.eq(deal_id))
            .filter(deal_category::Column::CategoryId.is_in(diff.to_remove.iter().copied()))
            .exec(conn)
            .await?;
    }
    if !diff.to_add.is_empty() {
        DealCategory::insert_many(diff.to_add.iter().map(|&category_id| {
            deal_category::ActiveModel {
                deal_id: Set(deal_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    debug!(
        "Deal {} categories: +{} -{}",
        deal_id,
        diff.to_add.len(),
        diff.to_remove.len()
    );
    Ok(diff)
}

/// Makes the store's categories equal to `desired`, returning the writes performed.
pub async fn sync_store_categories<C>(
    conn: &C,
    store_id: i64,
    desired: &BTreeSet<i64>,
) -> Result<CategoryDiff>
where
    C: ConnectionTrait,
{
    ensure_categories_exist(conn, desired).await?;
    let initial = store_category_ids(conn, store_id).await?;
    let diff = diff_category_ids(&initial, desired);

    if !diff.to_remove.is_empty() {
        StoreCategory::delete_many()
            .filter(store_category::Column::StoreId.eq(store_id))
            .filter(store_category::Column::CategoryId.is_in(diff.to_remove.iter().copied()))
            .exec(conn)
            .await?;
    }
    if !diff.to_add.is_empty() {
        StoreCategory::insert_many(diff.to_add.iter().map(|&category_id| {
            store_category::ActiveModel {
                store_id: Set(store_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    debug!(
        "Store {} categories: +{} -{}",
        store_id,
        diff.to_add.len(),
        diff.to_remove.len()
    );
    Ok(diff)
}

/// Categories linked to a deal, in navigation order.
pub async fn categories_of_deal<C>(conn: &C, deal_id: i64) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    let ids = deal_category_ids(conn, deal_id).await?;
    categories_by_ids(conn, ids).await
}

/// Categories linked to a store, in navigation order.
pub async fn categories_of_store<C>(conn: &C, store_id: i64) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    let ids = store_category_ids(conn, store_id).await?;
    categories_by_ids(conn, ids).await
}

async fn categories_by_ids<C>(conn: &C, ids: BTreeSet<i64>) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Category::find()
        .filter(category::Column::Id.is_in(ids))
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Title)
        .all(conn)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::DealType, test_utils::*};

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_diff_is_disjoint_set_difference() {
        let diff = diff_category_ids(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(diff.to_add, set(&[4, 5]));
        assert_eq!(diff.to_remove, set(&[1]));
        assert!(diff.to_add.is_disjoint(&diff.to_remove));
    }

    #[test]
    fn test_diff_of_equal_sets_is_empty() {
        assert!(diff_category_ids(&set(&[7, 8]), &set(&[8, 7])).is_empty());
        assert!(diff_category_ids(&set(&[]), &set(&[])).is_empty());
    }

    #[tokio::test]
    async fn test_sync_deal_categories_is_idempotent() -> Result<()> {
        let (db, settings, _country, store) = setup_with_store().await?;
        let deal =
            create_test_deal(&db, &settings, store.id, "d1", DealType::Discount, Some(10.0)).await?;
        let food = create_test_category(&db, "food").await?;
        let travel = create_test_category(&db, "travel").await?;
        let tech = create_test_category(&db, "tech").await?;

        let first = sync_deal_categories(&db, deal.id, &set(&[food.id, travel.id])).await?;
        assert_eq!(first.to_add.len(), 2);
        assert_eq!(deal_category_ids(&db, deal.id).await?, set(&[food.id, travel.id]));

        let second = sync_deal_categories(&db, deal.id, &set(&[food.id, travel.id])).await?;
        assert!(second.is_empty());

        let third = sync_deal_categories(&db, deal.id, &set(&[travel.id, tech.id])).await?;
        assert_eq!(third.to_add, set(&[tech.id]));
        assert_eq!(third.to_remove, set(&[food.id]));

        let linked = categories_of_deal(&db, deal.id).await?;
        assert_eq!(linked.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_store_categories_rejects_unknown_ids() -> Result<()> {
        let (db, _settings, _country, store) = setup_with_store().await?;
        let food = create_test_category(&db, "food").await?;

        let result = sync_store_categories(&db, store.id, &set(&[food.id, 404])).await;
        assert!(matches!(result, Err(Error::CategoryNotFound { key }) if key == "404"));
        assert!(store_category_ids(&db, store.id).await?.is_empty());

        sync_store_categories(&db, store.id, &set(&[food.id])).await?;
        assert_eq!(categories_of_store(&db, store.id).await?[0].id, food.id);

        let cleared = sync_store_categories(&db, store.id, &set(&[])).await?;
        assert_eq!(cleared.to_remove, set(&[food.id]));
        assert!(store_category_ids(&db, store.id).await?.is_empty());
        Ok(())
    }
}

//! Store summary derivation - Picks the deal a store features and caches it on the store.
//!
//! The featured deal is chosen from all deals the store owns:
//!
//! 1. Among `discount` and `amountOff` deals, the one with the highest `discount`
//!    (ties keep the earliest deal, a missing value counts as 0).
//! 2. Otherwise the earliest `bogo` or `freeShipping` deal.
//! 3. Otherwise nothing, and every cached field is NULL.
//!
//! A `bogo`/`freeShipping` winner is cached with `discount = 0` and `discount_unit = ""`
//! so that "featured deal without a number" stays distinguishable from "no deal".
//!
//! [`derive_store_summary`] is pure. [`recompute_store_summary`] runs it against the
//! committed deals of a store and writes the result back, and is always called on the
//! same connection or transaction as the mutation that triggered it.

use crate::{
    config::SummarySettings,
    core::{country, validate},
    entities::{Deal, DealType, Store, deal, store},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// The denormalised fields cached on a store row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSummary {
    /// Value of the featured deal
    pub discount: Option<f64>,
    /// Unit of the featured deal
    pub discount_unit: Option<String>,
    /// Type of the featured deal
    pub discount_type: Option<DealType>,
    /// Id of the featured deal
    pub discount_id: Option<i64>,
    /// Number of deals the store owns
    pub total_offers: i32,
}

impl StoreSummary {
    /// Reads the summary currently cached on `store`.
    #[must_use]
    pub fn cached_on(store: &store::Model) -> Self {
        Self {
            discount: store.discount,
            discount_unit: store.discount_unit.clone(),
            discount_type: store.discount_type,
            discount_id: store.discount_id,
            total_offers: store.total_offers,
        }
    }
}

/// Chooses the deal a store should feature, if any.
///
/// `deals` must be in a stable order (by id); that order decides ties.
#[must_use]
pub fn select_featured_deal(deals: &[deal::Model]) -> Option<&deal::Model> {
    let mut best_ranked: Option<&deal::Model> = None;
    let mut first_fallback: Option<&deal::Model> = None;

    for candidate in deals {
        if candidate.deal_type.is_ranked() {
            let value = candidate.discount.unwrap_or(0.0);
            match best_ranked {
                Some(current) if current.discount.unwrap_or(0.0) >= value => {}
                _ => best_ranked = Some(candidate),
            }
        } else if first_fallback.is_none() {
            first_fallback = Some(candidate);
        }
    }

    best_ranked.or(first_fallback)
}

/// Derives the summary for a store from its deals.
///
/// `currency_codes` maps country ids to ISO currency codes. It is consulted only for an
/// `amountOff` winner whose unit is `$`, first with the deal's country and then with
/// `store_country_id`.
#[must_use]
pub fn derive_store_summary(
    deals: &[deal::Model],
    store_country_id: i64,
    currency_codes: &HashMap<i64, String>,
    settings: &SummarySettings,
) -> StoreSummary {
    let total_offers = i32::try_from(deals.len()).unwrap_or(i32::MAX);

    let Some(featured) = select_featured_deal(deals) else {
        return StoreSummary {
            total_offers,
            ..StoreSummary::default()
        };
    };

    let (discount, unit) = match featured.deal_type {
        DealType::Discount => (
            featured.discount.unwrap_or(0.0),
            validate::PERCENT_UNIT.to_string(),
        ),
        DealType::AmountOff => {
            let raw = featured
                .discount_unit
                .as_deref()
                .filter(|u| !u.is_empty())
                .unwrap_or(validate::DOLLAR_UNIT);
            let unit = if raw == validate::DOLLAR_UNIT && settings.substitute_currency_code {
                currency_codes
                    .get(&featured.country_id)
                    .or_else(|| currency_codes.get(&store_country_id))
                    .map_or(raw, String::as_str)
            } else {
                raw
            };
            (featured.discount.unwrap_or(0.0), unit.to_string())
        }
        DealType::Bogo | DealType::FreeShipping => (0.0, String::new()),
    };

    StoreSummary {
        discount: Some(discount),
        discount_unit: Some(unit),
        discount_type: Some(featured.deal_type),
        discount_id: Some(featured.id),
        total_offers,
    }
}

/// Re-derives a store's summary from its committed deals and writes it back.
///
/// Call this on the transaction of the mutation that changed the deals. The store row
/// is locked for the rest of that transaction on backends that support row locks, so
/// two concurrent mutations of the same store serialise instead of overwriting each
/// other's summary. The write is skipped when the cached summary is already correct.
///
/// # Errors
/// Returns [`Error::StoreNotFound`] if the store does not exist, or a database error.
#[instrument(skip(conn, settings))]
pub async fn recompute_store_summary<C>(
    conn: &C,
    store_id: i64,
    settings: &SummarySettings,
) -> Result<store::Model>
where
    C: ConnectionTrait,
{
    let store = Store::find_by_id(store_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| Error::StoreNotFound {
            key: store_id.to_string(),
        })?;

    let deals = Deal::find()
        .filter(deal::Column::StoreId.eq(store_id))
        .order_by_asc(deal::Column::Id)
        .all(conn)
        .await?;

    let country_ids = deals
        .iter()
        .map(|d| d.country_id)
        .chain(std::iter::once(store.country_id));
    let currency_codes = country::currency_codes(conn, country_ids, &settings.locale).await?;

    let summary = derive_store_summary(&deals, store.country_id, &currency_codes, settings);
    if summary == StoreSummary::cached_on(&store) {
        debug!("Summary of store {} already up to date", store_id);
        return Ok(store);
    }

    let mut active: store::ActiveModel = store.into();
    active.discount = Set(summary.discount);
    active.discount_unit = Set(summary.discount_unit);
    active.discount_type = Set(summary.discount_type);
    active.discount_id = Set(summary.discount_id);
    active.total_offers = Set(summary.total_offers);
    let updated = active.update(conn).await?;

    info!(
        "Store {} now features deal {:?} ({} offers)",
        store_id, updated.discount_id, updated.total_offers
    );
    Ok(updated)
}

/// Runs [`recompute_store_summary`] in its own transaction.
///
/// Used to repair a store whose summary was written by an older, non-transactional
/// client.
pub async fn refresh_store_summary(
    db: &DatabaseConnection,
    store_id: i64,
    settings: &SummarySettings,
) -> Result<store::Model> {
    let txn = db.begin().await?;
    let store = recompute_store_summary(&txn, store_id, settings).await?;
    txn.commit().await?;
    Ok(store)
}

/// Recomputes every store, returning how many summaries changed.
pub async fn refresh_all_store_summaries(
    db: &DatabaseConnection,
    settings: &SummarySettings,
) -> Result<usize> {
    let stores = Store::find().order_by_asc(store::Column::Id).all(db).await?;
    let mut changed = 0;
    for existing in stores {
        let refreshed = refresh_store_summary(db, existing.id, settings).await?;
        if StoreSummary::cached_on(&refreshed) != StoreSummary::cached_on(&existing) {
            changed += 1;
        }
    }
    Ok(changed)
}

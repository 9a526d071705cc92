//! Autocomplete handlers for Discord slash command parameters.
//!
//! Stores, deals and categories are addressed by slug in every command. These
//! handlers suggest slugs whose slug or title contains what the operator has typed.

use crate::{
    bot::BotData,
    core::{
        category,
        deal::{self, DealFilter},
        store::{self, StoreFilter},
    },
    errors::Error,
};

/// Discord accepts at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Keeps the `(slug, title)` pairs matching `partial`, sorted by slug.
fn matching_slugs<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let partial_lower = partial.trim().to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|(slug, title)| {
            slug.contains(&partial_lower) || title.to_lowercase().contains(&partial_lower)
        })
        .map(|(slug, _)| slug)
        .collect();
    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for store slugs.
pub async fn autocomplete_store_slug(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let filter = StoreFilter {
        search: Some(partial.to_string()),
        ..StoreFilter::default()
    };

    let Ok(page) = store::list_stores(db, &filter, 0, MAX_SUGGESTIONS as u64).await else {
        return Vec::new();
    };
    matching_slugs(page.items.into_iter().map(|s| (s.slug, s.title)), partial)
}

/// Provides autocomplete suggestions for deal slugs.
pub async fn autocomplete_deal_slug(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let filter = DealFilter {
        search: Some(partial.to_string()),
        ..DealFilter::default()
    };

    let Ok(page) = deal::list_deals(db, &filter, 0, MAX_SUGGESTIONS as u64).await else {
        return Vec::new();
    };
    matching_slugs(page.items.into_iter().map(|d| (d.slug, d.title)), partial)
}

/// Provides autocomplete suggestions for category slugs.
pub async fn autocomplete_category_slug(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(categories) = category::get_all_categories(db, false).await else {
        return Vec::new();
    };
    matching_slugs(
        categories.into_iter().map(|c| (c.slug, c.title)),
        partial,
    )
}

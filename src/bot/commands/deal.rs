//! Deal Discord commands - `deal_manage` and `expire_deals`.
//!
//! Every deal mutation reports the owning store's featured deal afterwards, because
//! that summary is recomputed as part of the same change.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::shared, handlers::autocomplete, report_error},
        core::{
            SortDirection, category, category_links,
            deal::{self, DealChange, DealFilter, DealInput, DealSort},
        },
        entities::DealType,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DealTypeChoice {
        #[name = "Percent off"]
        Discount,
        #[name = "Amount off"]
        AmountOff,
        #[name = "Buy one get one"]
        Bogo,
        #[name = "Free shipping"]
        FreeShipping,
    }

    impl From<DealTypeChoice> for DealType {
        fn from(choice: DealTypeChoice) -> Self {
            match choice {
                DealTypeChoice::Discount => Self::Discount,
                DealTypeChoice::AmountOff => Self::AmountOff,
                DealTypeChoice::Bogo => Self::Bogo,
                DealTypeChoice::FreeShipping => Self::FreeShipping,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DealSortChoice {
        #[name = "Expiring soonest"]
        ExpiringSoon,
        #[name = "Biggest discount"]
        Discount,
        #[name = "Title (A-Z)"]
        Title,
        #[name = "Newest"]
        Newest,
    }

    impl DealSortChoice {
        const fn sort(self) -> (DealSort, SortDirection) {
            match self {
                Self::ExpiringSoon => (DealSort::ExpiryDate, SortDirection::Asc),
                Self::Discount => (DealSort::Discount, SortDirection::Desc),
                Self::Title => (DealSort::Title, SortDirection::Asc),
                Self::Newest => (DealSort::CreatedAt, SortDirection::Desc),
            }
        }
    }

    async fn say_change(
        ctx: poise::Context<'_, BotData, Error>,
        verb: &str,
        change: &DealChange,
    ) -> Result<()> {
        let mut message = format!(
            "✅ Deal **{}** {verb}.\n**{}** now features: {}",
            change.deal.title,
            change.store.title,
            shared::describe_store_summary(&change.store)
        );
        if let Some(previous) = &change.previous_store {
            message.push_str(&format!(
                "\n**{}** now features: {}",
                previous.title,
                shared::describe_store_summary(previous)
            ));
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Parent command for managing deals.
    #[poise::command(
        slash_command,
        subcommands(
            "deal_add",
            "deal_update",
            "deal_show",
            "deal_list",
            "deal_categories",
            "deal_delete"
        )
    )]
    pub async fn deal_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Deal management command. Available subcommands:\n\
            `/deal_manage add` - Add a deal to a store\n\
            `/deal_manage update` - Edit a deal\n\
            `/deal_manage show` - Show one deal\n\
            `/deal_manage list` - List deals\n\
            `/deal_manage categories` - Replace a deal's categories\n\
            `/deal_manage delete` - Delete a deal";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a deal to a store and refreshes the store's featured deal.
    #[poise::command(slash_command, rename = "add", check = "crate::bot::is_admin")]
    #[allow(clippy::too_many_arguments)]
    pub async fn deal_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store offering the deal"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
        #[description = "Headline"] title: String,
        #[description = "URL slug (a-z, 0-9, -)"] slug: String,
        #[description = "Coupon code"] code: String,
        #[description = "Kind of offer"] deal_type: DealTypeChoice,
        #[description = "Expiry date (YYYY-MM-DD)"] expiry: String,
        #[description = "Discount value (percent off or amount off)"] discount: Option<f64>,
        #[description = "Unit for amount off, defaults to $"] unit: Option<String>,
        #[description = "Two-letter country code; defaults to the store's"] country: Option<
            String,
        >,
        #[description = "Landing page"] url: Option<String>,
        #[description = "Long description"] description: Option<String>,
        #[description = "Comma-separated category slugs"] categories: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let store = shared::find_store(db, &store).await?;
            let country_id = match country.as_deref() {
                Some(code) => shared::find_country(db, code).await?.id,
                None => store.country_id,
            };
            let category_ids = match categories.as_deref() {
                Some(raw) => {
                    Some(category::ids_for_slugs(db, &shared::parse_slug_list(raw)).await?)
                }
                None => None,
            };
            let input = DealInput {
                title,
                slug,
                code,
                description,
                store_id: store.id,
                country_id,
                deal_type: deal_type.into(),
                discount,
                discount_unit: unit,
                url,
                is_active: true,
                expiry_date: shared::parse_expiry(&expiry)?,
                category_ids,
            };
            deal::create_deal(db, &data.settings.summary, input).await
        }
        .await;

        match result {
            Ok(change) => say_change(ctx, "created", &change).await,
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Edits a deal; omitted options keep their current value and `-` clears one.
    #[poise::command(slash_command, rename = "update", check = "crate::bot::is_admin")]
    #[allow(clippy::too_many_arguments)]
    pub async fn deal_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Deal to edit"]
        #[autocomplete = "autocomplete::autocomplete_deal_slug"]
        deal: String,
        #[description = "Move the deal to another store"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: Option<String>,
        #[description = "New headline"] title: Option<String>,
        #[description = "New coupon code"] code: Option<String>,
        #[description = "New kind of offer"] deal_type: Option<DealTypeChoice>,
        #[description = "New discount value"] discount: Option<f64>,
        #[description = "New unit for amount off"] unit: Option<String>,
        #[description = "New expiry date (YYYY-MM-DD)"] expiry: Option<String>,
        #[description = "New two-letter country code"] country: Option<String>,
        #[description = "Landing page (- clears)"] url: Option<String>,
        #[description = "Long description (- clears)"] description: Option<String>,
        #[description = "Whether the deal is published"] active: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let existing = deal::get_deal_by_slug(db, &deal)
                .await?
                .ok_or_else(|| Error::DealNotFound { key: deal.clone() })?;
            let store_id = match store.as_deref() {
                Some(slug) => shared::find_store(db, slug).await?.id,
                None => existing.store_id,
            };
            let country_id = match country.as_deref() {
                Some(code) => shared::find_country(db, code).await?.id,
                None => existing.country_id,
            };
            let expiry_date = match expiry.as_deref() {
                Some(raw) => shared::parse_expiry(raw)?,
                None => existing.expiry_date,
            };
            let new_type: DealType = deal_type.map_or(existing.deal_type, Into::into);
            // A unit only carries over while the type stays the same
            let discount_unit = unit.or_else(|| {
                (new_type == existing.deal_type)
                    .then(|| existing.discount_unit.clone())
                    .flatten()
            });
            let input = DealInput {
                title: title.unwrap_or_else(|| existing.title.clone()),
                slug: existing.slug.clone(),
                code: code.unwrap_or_else(|| existing.code.clone()),
                description: shared::edit_optional(description, existing.description.as_deref()),
                store_id,
                country_id,
                deal_type: new_type,
                discount: discount.or(existing.discount),
                discount_unit,
                url: shared::edit_optional(url, existing.url.as_deref()),
                is_active: active.unwrap_or(existing.is_active),
                expiry_date,
                category_ids: None,
            };
            deal::update_deal(db, &data.settings.summary, existing.id, input).await
        }
        .await;

        match result {
            Ok(change) => say_change(ctx, "updated", &change).await,
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Shows one deal with its categories.
    #[poise::command(slash_command, rename = "show")]
    pub async fn deal_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Deal to show"]
        #[autocomplete = "autocomplete::autocomplete_deal_slug"]
        deal: String,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let Some(found) = deal::get_deal_by_slug(db, &deal).await? else {
            return report_error(ctx, Error::DealNotFound { key: deal }).await;
        };
        let categories = category_links::categories_of_deal(db, found.id).await?;
        let category_list = if categories.is_empty() {
            "None".to_string()
        } else {
            categories
                .iter()
                .map(|c| c.title.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}**", found.title))
            .description(found.description.clone().unwrap_or_default())
            .color(0x0057_F287)
            .field("Offer", shared::describe_deal(&found), false)
            .field("Type", found.deal_type.to_string(), true)
            .field("Categories", category_list, true)
            .field("Link", found.url.as_deref().unwrap_or("-"), false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists deals, 25 per page.
    #[poise::command(slash_command, rename = "list")]
    pub async fn deal_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only deals of this store"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: Option<String>,
        #[description = "Only deals of this kind"] deal_type: Option<DealTypeChoice>,
        #[description = "Only active or inactive deals"] active: Option<bool>,
        #[description = "Search title, slug or code"] search: Option<String>,
        #[description = "Sort order"] sort: Option<DealSortChoice>,
        #[description = "Page number, starting at 1"] page: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let store_id = match store.as_deref() {
            Some(slug) => match shared::find_store(db, slug).await {
                Ok(store) => Some(store.id),
                Err(e) => return report_error(ctx, e).await,
            },
            None => None,
        };
        let (sort, direction) = sort.unwrap_or(DealSortChoice::ExpiringSoon).sort();
        let filter = DealFilter {
            store_id,
            country_id: None,
            deal_type: deal_type.map(Into::into),
            is_active: active,
            search,
            sort,
            direction,
        };
        let page_index = page.unwrap_or(1).saturating_sub(1);
        let page = deal::list_deals(db, &filter, page_index, 0).await?;

        if page.items.is_empty() {
            ctx.say("No deals found.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = page
            .items
            .iter()
            .map(|d| {
                (
                    format!("{} (`{}`)", d.title, d.slug),
                    shared::describe_deal(d),
                    false,
                )
            })
            .collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Deals**")
            .color(0x0057_F287)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {}/{} · {} deals",
                page.page + 1,
                page.page_count().max(1),
                page.total
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Replaces the categories of a deal.
    #[poise::command(slash_command, rename = "categories", check = "crate::bot::is_admin")]
    pub async fn deal_categories(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Deal to edit"]
        #[autocomplete = "autocomplete::autocomplete_deal_slug"]
        deal: String,
        #[description = "Comma-separated category slugs (empty clears)"] categories: Option<
            String,
        >,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let result = async {
            let found = deal::get_deal_by_slug(db, &deal)
                .await?
                .ok_or_else(|| Error::DealNotFound { key: deal.clone() })?;
            let slugs = shared::parse_slug_list(categories.as_deref().unwrap_or_default());
            let ids = category::ids_for_slugs(db, &slugs).await?;
            let diff = deal::set_deal_categories(db, found.id, &ids).await?;
            Ok::<_, Error>((found, diff))
        }
        .await;

        match result {
            Ok((found, diff)) => {
                ctx.say(format!(
                    "✅ Categories of **{}** updated (+{} -{}).",
                    found.title,
                    diff.to_add.len(),
                    diff.to_remove.len()
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Deletes a deal and refreshes its store's featured deal.
    #[poise::command(slash_command, rename = "delete", check = "crate::bot::is_admin")]
    pub async fn deal_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Deal to delete"]
        #[autocomplete = "autocomplete::autocomplete_deal_slug"]
        deal: String,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let found = deal::get_deal_by_slug(db, &deal)
                .await?
                .ok_or_else(|| Error::DealNotFound { key: deal.clone() })?;
            deal::delete_deal(db, &data.settings.summary, found.id).await
        }
        .await;

        match result {
            Ok(change) => say_change(ctx, "deleted", &change).await,
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Deactivates every active deal whose expiry date has passed.
    #[poise::command(slash_command, check = "crate::bot::is_admin")]
    pub async fn expire_deals(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only list the deals that would be deactivated"] dry_run: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let now = chrono::Utc::now();

        if dry_run.unwrap_or(false) {
            let expired = deal::get_expired_active_deals(db, now).await?;
            if expired.is_empty() {
                ctx.say("No active deals have expired.").await?;
                return Ok(());
            }
            let lines: Vec<String> = expired
                .iter()
                .take(25)
                .map(|d| format!("• `{}` {}", d.slug, shared::describe_deal(d)))
                .collect();
            ctx.say(format!(
                "{} expired deals would be deactivated:\n{}",
                expired.len(),
                lines.join("\n")
            ))
            .await?;
            return Ok(());
        }

        let count = deal::deactivate_expired_deals(db, now).await?;
        ctx.say(format!("✅ Deactivated {count} expired deals.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

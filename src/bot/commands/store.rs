//! Store Discord commands - `store_manage` and its subcommands.
//!
//! Stores are addressed by slug. Editing a store never touches its featured-deal
//! summary directly; `recompute` rebuilds it from the store's deals.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::shared, handlers::autocomplete, report_error},
        core::{
            SortDirection,
            assets::AssetPurpose,
            category_links,
            store::{self, StoreFilter, StoreInput, StoreSort},
            summary,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StoreSortChoice {
        #[name = "Title (A-Z)"]
        Title,
        #[name = "Most offers"]
        TotalOffers,
        #[name = "Biggest discount"]
        Discount,
        #[name = "Newest"]
        Newest,
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StoreImageChoice {
        #[name = "Profile picture"]
        ProfilePicture,
        #[name = "Cover"]
        Cover,
    }

    impl From<StoreImageChoice> for AssetPurpose {
        fn from(choice: StoreImageChoice) -> Self {
            match choice {
                StoreImageChoice::ProfilePicture => Self::ProfilePicture,
                StoreImageChoice::Cover => Self::Cover,
            }
        }
    }

    impl StoreSortChoice {
        const fn sort(self) -> (StoreSort, SortDirection) {
            match self {
                Self::Title => (StoreSort::Title, SortDirection::Asc),
                Self::TotalOffers => (StoreSort::TotalOffers, SortDirection::Desc),
                Self::Discount => (StoreSort::Discount, SortDirection::Desc),
                Self::Newest => (StoreSort::CreatedAt, SortDirection::Desc),
            }
        }
    }

    /// Parent command for managing stores.
    #[poise::command(
        slash_command,
        subcommands(
            "store_add",
            "store_update",
            "store_show",
            "store_list",
            "store_categories",
            "store_image",
            "store_recompute",
            "store_delete"
        )
    )]
    pub async fn store_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Store management command. Available subcommands:\n\
            `/store_manage add` - Add a new store\n\
            `/store_manage update` - Edit a store\n\
            `/store_manage show` - Show a store and its featured deal\n\
            `/store_manage list` - List stores\n\
            `/store_manage categories` - Replace a store's categories\n\
            `/store_manage image` - Upload a store's profile picture or cover\n\
            `/store_manage recompute` - Rebuild featured-deal summaries\n\
            `/store_manage delete` - Delete a store and its deals";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new store.
    #[poise::command(slash_command, rename = "add", check = "crate::bot::is_admin")]
    pub async fn store_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] title: String,
        #[description = "URL slug (a-z, 0-9, -)"] slug: String,
        #[description = "Two-letter country code"] country: String,
        #[description = "Contact phone, e.g. +15551234567"] phone: Option<String>,
        #[description = "Store website"] website_url: Option<String>,
        #[description = "Comma-separated category slugs"] categories: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let result = async {
            let country = shared::find_country(db, &country).await?;
            let category_ids = match categories.as_deref() {
                Some(raw) => Some(
                    crate::core::category::ids_for_slugs(db, &shared::parse_slug_list(raw))
                        .await?,
                ),
                None => None,
            };
            store::create_store(
                db,
                StoreInput {
                    title,
                    slug,
                    country_id: country.id,
                    phone,
                    website_url,
                    profile_picture_url: None,
                    cover_url: None,
                    is_active: true,
                    category_ids,
                },
            )
            .await
        }
        .await;

        match result {
            Ok(store) => {
                ctx.say(format!("✅ Store **{}** created as `{}`.", store.title, store.slug))
                    .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Edits a store; omitted options keep their current value and `-` clears one.
    #[poise::command(slash_command, rename = "update", check = "crate::bot::is_admin")]
    #[allow(clippy::too_many_arguments)]
    pub async fn store_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to edit"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
        #[description = "New display name"] title: Option<String>,
        #[description = "New URL slug"] new_slug: Option<String>,
        #[description = "New two-letter country code"] country: Option<String>,
        #[description = "Contact phone (- clears)"] phone: Option<String>,
        #[description = "Store website (- clears)"] website_url: Option<String>,
        #[description = "Whether the store is published"] active: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let existing = shared::find_store(db, &store).await?;
            let country_id = match country.as_deref() {
                Some(code) => shared::find_country(db, code).await?.id,
                None => existing.country_id,
            };
            let input = StoreInput {
                title: title.unwrap_or_else(|| existing.title.clone()),
                slug: new_slug.unwrap_or_else(|| existing.slug.clone()),
                country_id,
                phone: shared::edit_optional(phone, existing.phone.as_deref()),
                website_url: shared::edit_optional(website_url, existing.website_url.as_deref()),
                profile_picture_url: existing.profile_picture_url.clone(),
                cover_url: existing.cover_url.clone(),
                is_active: active.unwrap_or(existing.is_active),
                category_ids: None,
            };
            store::update_store(db, &data.settings.summary, existing.id, input).await
        }
        .await;

        match result {
            Ok(store) => {
                ctx.say(format!(
                    "✅ Store **{}** updated. {}",
                    store.title,
                    shared::describe_store_summary(&store)
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Shows a store, its featured deal and its categories.
    #[poise::command(slash_command, rename = "show")]
    pub async fn store_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to show"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let store = match shared::find_store(db, &store).await {
            Ok(store) => store,
            Err(e) => return report_error(ctx, e).await,
        };
        let categories = category_links::categories_of_store(db, store.id).await?;
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
            .title(format!("**{}**", store.title))
            .description(format!("`{}`", store.slug))
            .color(0x0058_65F2)
            .field("Featured", shared::describe_store_summary(&store), false)
            .field("Categories", category_list, false)
            .field(
                "Status",
                if store.is_active { "Active" } else { "Inactive" },
                true,
            )
            .field(
                "Website",
                store.website_url.as_deref().unwrap_or("-"),
                true,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists stores, 25 per page.
    #[poise::command(slash_command, rename = "list")]
    pub async fn store_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only stores in this country"] country: Option<String>,
        #[description = "Search title or slug"] search: Option<String>,
        #[description = "Sort order"] sort: Option<StoreSortChoice>,
        #[description = "Page number, starting at 1"] page: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let country_id = match country.as_deref() {
            Some(code) => match shared::find_country(db, code).await {
                Ok(country) => Some(country.id),
                Err(e) => return report_error(ctx, e).await,
            },
            None => None,
        };
        let (sort, direction) = sort.unwrap_or(StoreSortChoice::Title).sort();
        let filter = StoreFilter {
            country_id,
            is_active: None,
            search,
            sort,
            direction,
        };
        let page_index = page.unwrap_or(1).saturating_sub(1);
        let page = store::list_stores(db, &filter, page_index, 0).await?;

        if page.items.is_empty() {
            ctx.say("No stores found.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = page
            .items
            .iter()
            .map(|s| {
                (
                    format!("{} (`{}`)", s.title, s.slug),
                    shared::describe_store_summary(s),
                    false,
                )
            })
            .collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Stores**")
            .color(0x0058_65F2)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {}/{} · {} stores",
                page.page + 1,
                page.page_count().max(1),
                page.total
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Replaces the categories of a store.
    #[poise::command(slash_command, rename = "categories", check = "crate::bot::is_admin")]
    pub async fn store_categories(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to edit"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
        #[description = "Comma-separated category slugs (empty clears)"] categories: Option<
            String,
        >,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let result = async {
            let store = shared::find_store(db, &store).await?;
            let slugs = shared::parse_slug_list(categories.as_deref().unwrap_or_default());
            let ids = crate::core::category::ids_for_slugs(db, &slugs).await?;
            let diff = store::set_store_categories(db, store.id, &ids).await?;
            Ok::<_, Error>((store, diff))
        }
        .await;

        match result {
            Ok((store, diff)) => {
                ctx.say(format!(
                    "✅ Categories of **{}** updated (+{} -{}).",
                    store.title,
                    diff.to_add.len(),
                    diff.to_remove.len()
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Uploads a profile picture or cover for a store, replacing the previous one.
    #[poise::command(slash_command, rename = "image", check = "crate::bot::is_admin")]
    pub async fn store_image(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to edit"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
        #[description = "Which image to replace"] kind: StoreImageChoice,
        #[description = "Image file"] file: serenity::Attachment,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let existing = shared::find_store(db, &store).await?;
            let bytes = shared::download_image(&file).await?;
            store::set_store_image(
                db,
                &data.storage,
                existing.id,
                kind.into(),
                &file.filename,
                bytes,
            )
            .await
        }
        .await;

        match result {
            Ok(store) => {
                ctx.say(format!("🖼️ Updated the image of **{}**.", store.title))
                    .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Rebuilds the featured-deal summary of one store, or of every store.
    #[poise::command(slash_command, rename = "recompute", check = "crate::bot::is_admin")]
    pub async fn store_recompute(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to rebuild; all stores when omitted"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        if let Some(slug) = store {
            let result = async {
                let store = shared::find_store(db, &slug).await?;
                summary::refresh_store_summary(db, store.id, &data.settings.summary).await
            }
            .await;
            return match result {
                Ok(store) => {
                    ctx.say(format!(
                        "✅ **{}**: {}",
                        store.title,
                        shared::describe_store_summary(&store)
                    ))
                    .await?;
                    Ok(())
                }
                Err(e) => report_error(ctx, e).await,
            };
        }

        ctx.defer().await?;
        let changed = summary::refresh_all_store_summaries(db, &data.settings.summary).await?;
        ctx.say(format!("✅ Recomputed every store; {changed} summaries changed."))
            .await?;
        Ok(())
    }

    /// Deletes a store together with all of its deals.
    #[poise::command(slash_command, rename = "delete", check = "crate::bot::is_admin")]
    pub async fn store_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store to delete"]
        #[autocomplete = "autocomplete::autocomplete_store_slug"]
        store: String,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let result = async {
            let existing = shared::find_store(db, &store).await?;
            store::delete_store(db, existing.id).await
        }
        .await;

        match result {
            Ok(deleted) => {
                ctx.say(format!(
                    "🗑️ Store **{}** and its {} deals were deleted.",
                    deleted.title, deleted.total_offers
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;

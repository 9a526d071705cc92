//! Category Discord commands - `category_manage`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::shared, handlers::autocomplete, report_error},
        core::category::{self, CategoryInput},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for managing categories.
    #[poise::command(
        slash_command,
        subcommands(
            "category_add",
            "category_update",
            "category_list",
            "category_image",
            "category_delete"
        )
    )]
    pub async fn category_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Category management command. Available subcommands:\n\
            `/category_manage add` - Add a category\n\
            `/category_manage update` - Edit a category\n\
            `/category_manage list` - List categories in navigation order\n\
            `/category_manage image` - Upload a category's image\n\
            `/category_manage delete` - Delete a category and unlink it everywhere";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a category.
    #[poise::command(slash_command, rename = "add", check = "crate::bot::is_admin")]
    pub async fn category_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] title: String,
        #[description = "URL slug (a-z, 0-9, -)"] slug: String,
        #[description = "Position in navigation (0 first)"] sort_order: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let input = CategoryInput {
            title,
            slug,
            sort_order: sort_order.unwrap_or(0),
            image_url: None,
            is_active: true,
        };

        match category::create_category(db, input).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Category **{}** created as `{}`.",
                    created.title, created.slug
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Edits a category; omitted options keep their current value.
    #[poise::command(slash_command, rename = "update", check = "crate::bot::is_admin")]
    pub async fn category_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category to edit"]
        #[autocomplete = "autocomplete::autocomplete_category_slug"]
        category: String,
        #[description = "New display name"] title: Option<String>,
        #[description = "New URL slug"] new_slug: Option<String>,
        #[description = "New position in navigation"] sort_order: Option<i32>,
        #[description = "Whether the category is published"] active: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let result = async {
            let existing = category::get_category_by_slug(db, &category)
                .await?
                .ok_or_else(|| Error::CategoryNotFound {
                    key: category.clone(),
                })?;
            let input = CategoryInput {
                title: title.unwrap_or_else(|| existing.title.clone()),
                slug: new_slug.unwrap_or_else(|| existing.slug.clone()),
                sort_order: sort_order.unwrap_or(existing.sort_order),
                image_url: existing.image_url.clone(),
                is_active: active.unwrap_or(existing.is_active),
            };
            category::update_category(db, existing.id, input).await
        }
        .await;

        match result {
            Ok(updated) => {
                ctx.say(format!("✅ Category **{}** updated.", updated.title))
                    .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Lists all categories in navigation order with how often they are used.
    #[poise::command(slash_command, rename = "list")]
    pub async fn category_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;

        let categories = category::get_all_categories(db, false).await?;
        if categories.is_empty() {
            ctx.say("No categories yet. Use `/category_manage add` to create some!")
                .await?;
            return Ok(());
        }

        let mut fields = Vec::new();
        for c in categories.iter().take(25) {
            let (deals, stores) = category::usage_counts(db, c.id).await?;
            let status = if c.is_active { "" } else { " · inactive" };
            fields.push((
                format!("{}. {} (`{}`)", c.sort_order, c.title, c.slug),
                format!("{deals} deals · {stores} stores{status}"),
                false,
            ));
        }

        let embed = serenity::CreateEmbed::default()
            .title("**Categories**")
            .color(0x00FE_E75C)
            .fields(fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Uploads a category image, replacing the previous one.
    #[poise::command(slash_command, rename = "image", check = "crate::bot::is_admin")]
    pub async fn category_image(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category to edit"]
        #[autocomplete = "autocomplete::autocomplete_category_slug"]
        category: String,
        #[description = "Image file"] file: serenity::Attachment,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let existing = category::get_category_by_slug(db, &category)
                .await?
                .ok_or_else(|| Error::CategoryNotFound {
                    key: category.clone(),
                })?;
            let bytes = shared::download_image(&file).await?;
            category::set_category_image(db, &data.storage, existing.id, &file.filename, bytes)
                .await
        }
        .await;

        match result {
            Ok(updated) => {
                ctx.say(format!("🖼️ Updated the image of **{}**.", updated.title))
                    .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }

    /// Deletes a category with its image and removes it from every deal and store.
    #[poise::command(slash_command, rename = "delete", check = "crate::bot::is_admin")]
    pub async fn category_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category to delete"]
        #[autocomplete = "autocomplete::autocomplete_category_slug"]
        category: String,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = async {
            let existing = category::get_category_by_slug(db, &category)
                .await?
                .ok_or_else(|| Error::CategoryNotFound {
                    key: category.clone(),
                })?;
            category::delete_category_with_image(db, &data.storage, existing.id).await
        }
        .await;

        match result {
            Ok(deleted) => {
                ctx.say(format!("🗑️ Category **{}** deleted.", deleted.title))
                    .await?;
                Ok(())
            }
            Err(e) => report_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;

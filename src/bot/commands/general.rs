//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and operator assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**DealDesk Help**\n\
        Back-office commands for stores, deals and categories.\n\n\
        **Stores**\n\
        • `/store_manage add|update|show|list|delete` - Manage stores.\n\
        • `/store_manage categories <store> <slugs>` - Replace a store's categories.\n\
        • `/store_manage recompute [store]` - Rebuild the featured-deal summary.\n\n\
        **Deals**\n\
        • `/deal_manage add|update|show|list|delete` - Manage deals.\n\
        • `/deal_manage categories <deal> <slugs>` - Replace a deal's categories.\n\
        • `/expire_deals [dry_run]` - Deactivate deals past their expiry date.\n\n\
        **Categories**\n\
        • `/category_manage add|update|list|delete` - Manage categories.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Category lists are comma-separated slugs, e.g. `food, travel`.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

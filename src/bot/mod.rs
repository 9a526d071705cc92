//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord operator surface for the `DealDesk` back office,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (store, deal, category, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::{AdminList, Settings},
    core::assets::MemoryStorage,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the object storage for store and
/// category images, the loaded settings and the admin allow-list.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Where uploaded images are kept
    pub storage: MemoryStorage,
    /// Settings loaded from config.toml
    pub settings: Settings,
    /// Users allowed to run mutating commands
    pub admins: AdminList,
}

impl BotData {
    /// Creates a new `BotData` instance with empty image storage.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings, admins: AdminList) -> Self {
        Self {
            database,
            storage: MemoryStorage::new(),
            settings,
            admins,
        }
    }
}

/// Command check rejecting callers that are not on the admin allow-list.
pub async fn is_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    let user_id = ctx.author().id.to_string();
    if ctx.data().admins.allows(&user_id) {
        Ok(true)
    } else {
        Err(Error::Unauthorized { user_id })
    }
}

/// Replies with a user-facing error and swallows it; any other error is returned.
pub async fn report_error(ctx: poise::Context<'_, BotData, Error>, error: Error) -> Result<()> {
    if error.is_user_facing() {
        ctx.say(format!("❌ {error}")).await?;
        Ok(())
    } else {
        Err(error)
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .say("❌ Something went wrong. The error has been logged.")
                .await
            {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            warn!("Check failed for `{}`: {}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("⛔ {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// All commands the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::store_manage(),
        commands::deal_manage(),
        commands::category_manage(),
        commands::expire_deals(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn subcommand_names(parent: &str) -> Vec<String> {
        all_commands()
            .into_iter()
            .find(|c| c.name == parent)
            .map(|c| c.subcommands.into_iter().map(|s| s.name).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_image_subcommands_registered() {
        assert!(subcommand_names("store_manage").iter().any(|n| n == "image"));
        assert!(subcommand_names("category_manage").iter().any(|n| n == "image"));
        assert!(subcommand_names("category_manage").iter().any(|n| n == "delete"));
    }
}

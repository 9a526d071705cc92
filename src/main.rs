use dealdesk::{
    bot::{self, BotData},
    config::{self, AdminList},
    core::{seed, summary},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings and the admin allow-list
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    let admins = AdminList::from_env();
    if !admins.is_restricted() {
        warn!("DEALDESK_ADMIN_IDS is empty; every user may run admin commands");
    }

    // 4. Connect and make sure the schema exists
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed reference data and repair any stale store summaries
    seed::seed_reference_data(&db, &settings)
        .await
        .inspect_err(|e| error!("Failed to seed reference data: {}", e))?;
    let repaired = summary::refresh_all_store_summaries(&db, &settings.summary).await?;
    if repaired > 0 {
        warn!("Repaired {} stale store summaries on start-up", repaired);
    }

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, settings, admins)).await
}

//! Startup helpers: settings resolution and handler context construction.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use feedlog_core::{Config, FeedingStore, Settings, SystemClock, create_storage};

use crate::handlers::BotContext;


/// Load the merged configuration: `.env` file, then the config file, then
/// environment overrides. The config is returned unresolved so logging can be
/// set up before required values are checked.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    // A missing .env file is normal.
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: failed to load .env file: {}", e);
    }

    let mut config = Config::load(path).context("Failed to load config")?;
    config.apply_env();
    Ok(config)
}

/// Resolve runtime settings. The token is never passed to any tracing macro.
///
/// # Errors
///
/// Returns an error naming the missing or invalid setting.
pub fn resolve_settings(config: &Config) -> anyhow::Result<Settings> {
    config.resolve().context("Invalid configuration")
}

/// Open the store and assemble the shared handler context.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn build_context(settings: &Settings) -> anyhow::Result<BotContext> {
    let store: Arc<dyn FeedingStore> = Arc::from(
        create_storage(&settings.database_url)
            .await
            .context("Failed to open the feeding store")?,
    );

    Ok(BotContext {
        gate: settings.gate.clone(),
        store,
        window: settings.window,
        clock: Arc::new(SystemClock),
    })
}

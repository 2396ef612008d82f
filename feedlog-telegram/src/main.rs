//! Feedlog Telegram Bot: logs feedings per user and reports totals.
//!
//! Wires `feedlog-core` (configuration, access gate, time window, store) to
//! the Telegram Bot API. Any startup failure exits non-zero; per-message
//! failures are logged and the bot keeps running.

mod commands;
mod format;
mod handlers;
mod startup;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use feedlog_core::Config;
use feedlog_core::config::Rotation;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing_subscriber::prelude::*;

/// Feedlog Telegram Bot
#[derive(Parser)]
#[command(name = "feedlog-telegram", version)]
struct Args {
    /// Path to a custom config file (overrides default search locations)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

/// Default tracing directives enabling info-level logs for this crate and feedlog-core.
const DEFAULT_DIRECTIVES: &[&str] = &["feedlog_telegram=info", "feedlog_core=info"];

/// Build the default `EnvFilter`: RUST_LOG (if set) plus our default directives.
fn default_env_filter() -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in DEFAULT_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Initialize the tracing subscriber.
///
/// With a `[logging]` section, logs go to stdout and to a rolling file.
/// Without one, stdout only.
///
/// Returns the non-blocking writer guard that must be held for the process lifetime.
fn init_tracing(
    config: &Config,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(ref lc) = config.logging else {
        tracing_subscriber::fmt()
            .with_env_filter(default_env_filter()?)
            .init();
        return Ok(None);
    };

    if let Err(e) = std::fs::create_dir_all(&lc.directory) {
        eprintln!(
            "Warning: Failed to create log directory '{}': {}. Falling back to stdout-only.",
            lc.directory, e
        );
        tracing_subscriber::fmt()
            .with_env_filter(default_env_filter()?)
            .init();
        return Ok(None);
    }

    let rotation = match lc.rotation {
        Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
        Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
        Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
    };

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix("feedlog-telegram")
        .filename_suffix("log")
        .max_log_files(lc.max_files)
        .build(&lc.directory)
        .context("Failed to create rolling file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(default_env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Load configuration first; tracing init depends on it.
    let config = startup::load_config(args.config.as_deref())?;

    // 2. Initialize tracing (stdout-only or stdout+file).
    let _guard = init_tracing(&config)?;

    tracing::info!("Starting Feedlog Telegram Bot");

    // 3. Check required settings and the time zone. Fatal on failure.
    let settings = startup::resolve_settings(&config)?;
    tracing::info!(
        "{} authorized users, time zone {}",
        settings.gate.len(),
        settings.window.zone()
    );

    // 4. Open the store (runs migrations).
    let ctx = Arc::new(startup::build_context(&settings).await?);

    // 5. Create the bot and fetch its identity (required for filter_command parsing).
    let bot = Bot::new(settings.token.clone());
    let me = bot.get_me().await.context("Failed to fetch bot identity")?;
    tracing::info!("Bot started: @{}", me.username());

    // 6. Register slash commands with Telegram (for autocomplete UI). Non-fatal on failure.
    if let Err(e) = bot
        .set_my_commands(commands::Command::bot_commands())
        .await
    {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let keyboard = Arc::new(commands::build_keyboard());

    // 7. Commands route separately from free text.
    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<commands::Command>()
                .endpoint(commands::handle_command),
        )
        .branch(dptree::entry().endpoint(handlers::handle_message));

    tracing::info!("Dispatcher ready, polling for updates");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![me, ctx, keyboard])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("Dispatcher stopped, shutting down");
    Ok(())
}

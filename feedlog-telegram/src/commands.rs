//! Telegram bot slash-command handlers for Feedlog.
//!
//! Implements `/start`, `/add <n>`, `/total`, `/today`, `/today_row`,
//! `/delete <id>` and `/help`. Each command is one store call at most; store
//! failures are logged and answered with a fixed failure text.
//!
//! The reply keyboard lives in the [`keyboard`] submodule.

mod keyboard;


pub use keyboard::{SHOW_TODAY_LABEL, build_keyboard};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feedlog_core::Amount;
use feedlog_core::record::parse_record_id;
use teloxide::prelude::*;
use teloxide::types::{KeyboardMarkup, Message as TgMessage};
use teloxide::utils::command::BotCommands;

use crate::format;
use crate::handlers::{BotContext, Input, Reply, respond, send_reply, sender_id};

/// All slash commands supported by the Feedlog bot.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    /// Log an amount from 1 to 20.
    #[command(description = "Add food (1-20)")]
    Add(String),
    #[command(description = "Total amount of food")]
    Total,
    #[command(description = "Amount of food today")]
    Today,
    /// List today's records, oldest first.
    #[command(description = "All records for today")]
    TodayRow,
    /// Delete one of the sender's own records by ID.
    #[command(description = "Delete a record by ID")]
    Delete(String),
    #[command(description = "Show available commands")]
    Help,
}

/// Entry-point handler for all slash commands.
pub async fn handle_command(
    bot: Bot,
    msg: TgMessage,
    cmd: Command,
    ctx: Arc<BotContext>,
    keyboard: Arc<KeyboardMarkup>,
) -> ResponseResult<()> {
    let sender = sender_id(&msg);
    tracing::debug!("Command {:?} from user {}", cmd, sender);

    let reply = respond(&ctx, sender, Input::Command(cmd)).await;
    send_reply(&bot, &msg, reply, &keyboard).await;
    Ok(())
}

/// Run an authorized command.
pub(crate) async fn execute(ctx: &BotContext, sender: u64, cmd: Command) -> Reply {
    match cmd {
        Command::Start => Reply::text(format::GREETING).with_keyboard(),
        Command::Help => Reply::text(format::HELP_TEXT),
        Command::Add(ref arg) => match arg.trim().parse::<Amount>() {
            Ok(amount) => Reply::text(add(ctx, sender, amount).await.unwrap_or_else(|e| e)),
            Err(_) => Reply::text(format::ADD_USAGE),
        },
        Command::Total => total(ctx).await,
        Command::Today => today(ctx, sender).await,
        Command::TodayRow => today_rows(ctx, sender).await,
        Command::Delete(ref arg) => match parse_record_id(arg.trim()) {
            Ok(id) => delete(ctx, sender, id).await,
            Err(_) => Reply::text(format::DELETE_USAGE),
        },
    }
}

/// Insert a record. `Ok` carries the confirmation, `Err` the failure text.
pub(crate) async fn add(ctx: &BotContext, sender: u64, amount: Amount) -> Result<String, String> {
    match ctx.store.insert(sender, amount).await {
        Ok(id) => {
            tracing::info!("User {} added record {} ({}g)", sender, id, amount);
            Ok(format::added(amount))
        }
        Err(e) => {
            tracing::error!("Failed to add record for user {}: {}", sender, e);
            Err(format::ADD_FAILED.to_string())
        }
    }
}

async fn total(ctx: &BotContext) -> Reply {
    match ctx.store.sum_all().await {
        Ok(sum) => Reply::text(format::total(sum)),
        Err(e) => {
            tracing::error!("Failed to read total: {}", e);
            Reply::text(format::READ_FAILED)
        }
    }
}

/// Sum for the current local day. Shared with the "today" keyboard button.
pub(crate) async fn today(ctx: &BotContext, sender: u64) -> Reply {
    match ctx.store.sum_since(start_of_today(ctx)).await {
        Ok(sum) => Reply::text(format::today(sum)),
        Err(e) => {
            tracing::error!("Failed to read today's total for user {}: {}", sender, e);
            Reply::text(format::READ_FAILED)
        }
    }
}

async fn today_rows(ctx: &BotContext, sender: u64) -> Reply {
    match ctx.store.list_since(start_of_today(ctx)).await {
        Ok(records) => Reply::text(format::today_rows(&records, &ctx.window, sender)),
        Err(e) => {
            tracing::error!("Failed to list today's records for user {}: {}", sender, e);
            Reply::text(format::TODAY_ROWS_FAILED)
        }
    }
}

/// Owner-scoped delete. The confirmation is sent whether or not a row was
/// actually removed.
async fn delete(ctx: &BotContext, sender: u64, id: i64) -> Reply {
    match ctx.store.delete_by_id_and_owner(id, sender).await {
        Ok(removed) => {
            if removed {
                tracing::info!("User {} deleted record {}", sender, id);
            } else {
                tracing::debug!("User {} asked to delete record {}: no match", sender, id);
            }
            Reply::text(format::deleted(id))
        }
        Err(e) => {
            tracing::error!("Failed to delete record {} for user {}: {}", id, sender, e);
            Reply::text(format::DELETE_FAILED)
        }
    }
}

fn start_of_today(ctx: &BotContext) -> DateTime<Utc> {
    ctx.window.start_of_day(ctx.clock.now())
}

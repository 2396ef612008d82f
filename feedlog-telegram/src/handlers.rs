//! Telegram message handler for the Feedlog bot.
//!
//! Every inbound message is handled on its own: access check, then either a
//! slash command (see [`crate::commands`]) or free text. The decision logic in
//! [`respond`] is transport-free and returns a [`Reply`]; the teloxide
//! endpoints only deliver it.

use std::sync::Arc;

use feedlog_core::{AccessGate, Amount, Clock, DayWindow, FeedingStore};
use teloxide::prelude::*;
use teloxide::types::{KeyboardMarkup, Message as TgMessage};

use crate::commands::{self, Command, SHOW_TODAY_LABEL};
use crate::format;

/// Everything a handler needs, shared by all updates.
pub struct BotContext {
    pub gate: AccessGate,
    pub store: Arc<dyn FeedingStore>,
    pub window: DayWindow,
    pub clock: Arc<dyn Clock>,
}

/// One inbound message, already classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Text(String),
}

/// What to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Attach the quick-reply keyboard.
    pub keyboard: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: false,
        }
    }

    pub fn with_keyboard(mut self) -> Self {
        self.keyboard = true;
        self
    }
}

/// Decide the reply for one message from `sender`.
///
/// Unauthorized senders get [`format::DENIED_REPLY`] and nothing else
/// happens: the store is never touched.
pub async fn respond(ctx: &BotContext, sender: u64, input: Input) -> Reply {
    if !ctx.gate.is_authorized(sender) {
        tracing::info!("Denied access to user {}", sender);
        return Reply::text(format::DENIED_REPLY);
    }

    match input {
        Input::Command(cmd) => commands::execute(ctx, sender, cmd).await,
        Input::Text(text) => handle_text(ctx, sender, &text).await,
    }
}

/// Free text: the "today" button, a bare amount, or a hint.
async fn handle_text(ctx: &BotContext, sender: u64, text: &str) -> Reply {
    if text == SHOW_TODAY_LABEL {
        return commands::today(ctx, sender).await;
    }

    // Unparsed slash commands land here too.
    if text.starts_with('/') {
        return Reply::text(format::UNKNOWN_COMMAND);
    }

    match text.parse::<Amount>() {
        Ok(amount) => match commands::add(ctx, sender, amount).await {
            Ok(confirmation) => Reply::text(confirmation).with_keyboard(),
            Err(failure) => Reply::text(failure),
        },
        Err(_) => Reply::text(format::TEXT_USAGE).with_keyboard(),
    }
}

/// The sender's Telegram user ID; `0` (never authorized) when absent.
pub fn sender_id(msg: &TgMessage) -> u64 {
    msg.from.as_ref().map(|u| u.id.0).unwrap_or(0)
}

/// Deliver a reply. Send failures are logged and swallowed so one bad send
/// never affects the next message.
pub async fn send_reply(bot: &Bot, msg: &TgMessage, reply: Reply, keyboard: &KeyboardMarkup) {
    let request = bot.send_message(msg.chat.id, reply.text);
    let result = if reply.keyboard {
        request.reply_markup(keyboard.clone()).await
    } else {
        request.await
    };
    if let Err(e) = result {
        tracing::warn!("Failed to send reply to chat {}: {}", msg.chat.id.0, e);
    }
}

/// Endpoint for every message that is not a recognised command.
///
/// Non-text messages are treated as empty text and get the usage hint.
pub async fn handle_message(
    bot: Bot,
    msg: TgMessage,
    ctx: Arc<BotContext>,
    keyboard: Arc<KeyboardMarkup>,
) -> ResponseResult<()> {
    let sender = sender_id(&msg);
    let text = msg.text().unwrap_or_default().to_string();
    tracing::debug!("Text message from user {}", sender);

    let reply = respond(&ctx, sender, Input::Text(text)).await;
    send_reply(&bot, &msg, reply, &keyboard).await;
    Ok(())
}

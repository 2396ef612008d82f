//! Access control for the bot.
//!
//! The set of authorized users is built once at startup and never mutated.
//! Changing membership requires a restart.

use std::collections::HashSet;

/// Immutable set of Telegram user IDs allowed to use the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessGate {
    allowed: HashSet<u64>,
}

impl AccessGate {
    pub fn new(users: impl IntoIterator<Item = u64>) -> Self {
        Self {
            allowed: users.into_iter().collect(),
        }
    }

    /// Check whether `user_id` may talk to the bot.
    ///
    /// Returns `false` for an empty gate (secure by default).
    pub fn is_authorized(&self, user_id: u64) -> bool {
        self.allowed.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

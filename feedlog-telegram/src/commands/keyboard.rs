//! Quick-reply keyboard.
//!
//! A fixed grid of amount buttons `1..=20` (four rows of five) plus a single
//! button that shows today's total. Built once at startup and attached to the
//! replies that offer quick entry.

use feedlog_core::record::{MAX_AMOUNT, MIN_AMOUNT};
use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// Label of the button that behaves like `/today`.
pub const SHOW_TODAY_LABEL: &str = "Show today's food";

/// Amount buttons per keyboard row.
const BUTTONS_PER_ROW: usize = 5;

/// Button labels, row by row.
pub fn keyboard_labels() -> Vec<Vec<String>> {
    let amounts: Vec<String> = (MIN_AMOUNT..=MAX_AMOUNT).map(|n| n.to_string()).collect();
    let mut rows: Vec<Vec<String>> = amounts
        .chunks(BUTTONS_PER_ROW)
        .map(|row| row.to_vec())
        .collect();
    rows.push(vec![SHOW_TODAY_LABEL.to_string()]);
    rows
}

/// Build the reply keyboard markup.
pub fn build_keyboard() -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = keyboard_labels()
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect();
    KeyboardMarkup::new(rows)
}

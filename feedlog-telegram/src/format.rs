//! Reply text for the Feedlog bot.

use feedlog_core::{Amount, DayWindow, FeedingRecord, RecordId};

/// Sent to anyone not in the allowed-user set.
pub const DENIED_REPLY: &str = "You do not have access to this bot.";

pub const GREETING: &str = "Hi! Use /help to see the available commands.";

pub const HELP_TEXT: &str = "Available commands:\n\
    - /add <amount>: log food (a number from 1 to 20). Example: /add 5\n\
    - /total: show the total amount of food\n\
    - /today: show the amount of food for today\n\
    - /today_row: show every record for today\n\
    - /delete <id>: delete one of your records by ID. Example: /delete 1\n\
    - /help: show this message\n\
    You can also use the keyboard buttons.";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see the list of commands.";

pub const ADD_USAGE: &str = "Please give a number from 1 to 20. Example: /add 5";

/// Hint for free text that is neither a number nor the "today" button.
pub const TEXT_USAGE: &str =
    "Please pick a number from 1 to 20 or use the button to see today's total.";

pub const DELETE_USAGE: &str = "Please give a valid record ID to delete. Example: /delete 1";

pub const NO_RECORDS_TODAY: &str = "No records today.";

pub const ADD_FAILED: &str = "Failed to save the record.";

pub const READ_FAILED: &str = "Failed to fetch data.";

pub const TODAY_ROWS_FAILED: &str = "Failed to fetch today's records.";

pub const DELETE_FAILED: &str = "Failed to delete the record. Make sure the ID is correct.";

/// Appended to records owned by the requester.
pub const OWNER_MARK: &str = " (you)";

const TODAY_ROWS_HEADER: &str = "Today's records:";

pub fn added(amount: Amount) -> String {
    format!("Added {}g of food.", amount)
}

pub fn total(sum: i64) -> String {
    format!("Total food added: {}g.", sum)
}

/// Today's sum. Zero means nothing was logged today.
pub fn today(sum: i64) -> String {
    if sum == 0 {
        NO_RECORDS_TODAY.to_string()
    } else {
        format!("Added today: {}g.", sum)
    }
}

pub fn deleted(id: RecordId) -> String {
    format!("Record {} deleted.", id)
}

/// One line of the `/today_row` listing, time rendered in the window's zone.
pub fn record_line(record: &FeedingRecord, window: &DayWindow, requester: u64) -> String {
    let mark = if record.owner_id == requester {
        OWNER_MARK
    } else {
        ""
    };
    format!(
        "ID: {}, Корм: {}, Время: {}{}",
        record.id,
        record.amount,
        window.format_time(record.created_at),
        mark
    )
}

/// The full `/today_row` reply. Records are expected oldest first.
pub fn today_rows(records: &[FeedingRecord], window: &DayWindow, requester: u64) -> String {
    if records.is_empty() {
        return NO_RECORDS_TODAY.to_string();
    }
    let lines: Vec<String> = records
        .iter()
        .map(|r| record_line(r, window, requester))
        .collect();
    format!("{}\n{}", TODAY_ROWS_HEADER, lines.join("\n"))
}

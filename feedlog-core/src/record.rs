//! Feeding records and the input validation that guards them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Smallest amount a single record may hold.
pub const MIN_AMOUNT: i64 = 1;

/// Largest amount a single record may hold.
pub const MAX_AMOUNT: i64 = 20;

/// Store-assigned record identifier. Increases in creation order.
pub type RecordId = i64;

/// Rejected user input. Shown to the user as a hint, never logged as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The input is not an integer.
    #[error("not a number: '{0}'")]
    NotANumber(String),

    /// The amount is outside `MIN_AMOUNT..=MAX_AMOUNT`.
    #[error("amount {0} is out of range 1..=20")]
    AmountOutOfRange(i64),

    /// Record IDs are positive.
    #[error("record id must be positive, got {0}")]
    NonPositiveId(i64),
}

/// A food quantity in grams, guaranteed to be within `MIN_AMOUNT..=MAX_AMOUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u8);

impl Amount {
    /// Validate a raw integer.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOutOfRange`] outside `1..=20`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (MIN_AMOUNT..=MAX_AMOUNT).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::AmountOutOfRange(value))
        }
    }

    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    /// Parse the whole string as an integer. Surrounding whitespace is not
    /// stripped; callers trim command arguments themselves.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<i64>()
            .map_err(|_| ValidationError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a record ID argument. Must be a positive integer.
///
/// # Errors
///
/// Returns [`ValidationError::NotANumber`] or [`ValidationError::NonPositiveId`].
pub fn parse_record_id(s: &str) -> Result<RecordId, ValidationError> {
    let id = s
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(s.to_string()))?;
    if id <= 0 {
        return Err(ValidationError::NonPositiveId(id));
    }
    Ok(id)
}

/// One logged feeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedingRecord {
    pub id: RecordId,
    /// Telegram user ID of the creator. Immutable.
    pub owner_id: u64,
    pub amount: Amount,
    /// Set by the store at insertion.
    pub created_at: DateTime<Utc>,
}

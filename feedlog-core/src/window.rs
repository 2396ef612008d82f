//! Day boundaries in a configured time zone.
//!
//! "Today" always means the local date in the configured zone, never the
//! zone of the machine running the bot.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::ConfigError;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Calendar-day arithmetic in one time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    zone: Tz,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl DayWindow {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Resolve a zone by IANA name. `None` or an empty name means UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimezone`] if the name is not a known zone.
    pub fn from_name(name: Option<&str>) -> Result<Self, ConfigError> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Ok(Self::default()),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::new)
                .map_err(|_| ConfigError::InvalidTimezone(name.to_string())),
        }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// The instant local midnight began for the local date of `now`.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let date = now.with_timezone(&self.zone).date_naive();
        self.first_instant_of(date)
    }

    /// Render `instant` as local `HH:MM`.
    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.zone).format("%H:%M").to_string()
    }

    /// Midnight may be skipped by a DST transition; in that case the day starts
    /// at the first local hour that exists. Ambiguous times take the earliest.
    fn first_instant_of(&self, date: NaiveDate) -> DateTime<Utc> {
        (0..24)
            .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
            .find_map(|local| self.zone.from_local_datetime(&local).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
    }
}

/// Start of the current local day in the named zone (UTC when unset).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTimezone`] if `zone_name` is set but unknown.
pub fn start_of_today(
    zone_name: Option<&str>,
    clock: &dyn Clock,
) -> Result<DateTime<Utc>, ConfigError> {
    Ok(DayWindow::from_name(zone_name)?.start_of_day(clock.now()))
}

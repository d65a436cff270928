// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Calendar days follow the server's local timezone. Every service reads the
//! current time through a [`Clock`] so tests can pin "today".

use chrono::{DateTime, Days, Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use std::time::Duration;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Current calendar day in the server's local timezone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Clock pinned to local noon on `date`.
    pub fn at_noon(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let local = Local
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(Local::now);
        Self(local)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The day before `date`.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

/// Time remaining until the next local midnight after `now`.
///
/// Falls back to 24 hours if the next midnight does not exist locally
/// (DST transitions at midnight).
pub fn duration_until_next_midnight(now: DateTime<Local>) -> Duration {
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    let Some(tomorrow) = now.date_naive().checked_add_days(Days::new(1)) else {
        return DAY;
    };
    let Some(midnight) = tomorrow.and_hms_opt(0, 0, 0) else {
        return DAY;
    };
    let Some(next) = Local.from_local_datetime(&midnight).earliest() else {
        return DAY;
    };

    (next - now).to_std().unwrap_or(DAY)
}

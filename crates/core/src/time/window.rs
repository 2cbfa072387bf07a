use crate::engine::EngineError;
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on report length; the engine targets days-to-weeks windows.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Inclusive date range `[start, end]` a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(end: NaiveDate, days: u32) -> Result<Self, EngineError> {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(EngineError::InvalidInput(format!(
                "window_days must be 1..={MAX_WINDOW_DAYS} (got {days})"
            )));
        }

        let start = end
            .checked_sub_signed(Duration::days(i64::from(days) - 1))
            .ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "window of {days} days ending {end} starts before the earliest supported date"
                ))
            })?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Today's calendar date for reports, shifted by the configured UTC offset.
pub fn today(now_utc: DateTime<Utc>, utc_offset_hours: i32) -> anyhow::Result<NaiveDate> {
    let offset = chrono::FixedOffset::east_opt(utc_offset_hours * 3600)
        .with_context(|| format!("invalid UTC offset: {utc_offset_hours}h"))?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}

pub fn resolve_end_date(
    end_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_hours: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = end_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date (expected YYYY-MM-DD): {s}"));
    }

    today(now_utc, utc_offset_hours)
}

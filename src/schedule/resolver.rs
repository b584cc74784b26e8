//! Resolution of vague due-date phrases to concrete local date-times.
//!
//! Pure: the result depends only on the phrase, the injected `now` and the
//! resolver's configured times. Weekdays are numbered 1 = Sunday .. 7 = Saturday.
//!
//! | phrase | result |
//! |---|---|
//! | today, tonight | today at the evening time (17:00) |
//! | tomorrow, tomorrow morning | start of tomorrow |
//! | tomorrow afternoon, tomorrow evening | tomorrow at the evening time |
//! | this weekend | next Saturday, never today |
//! | next week | today + 7 days |
//! | next month | today + 1 month (clamped to month end) |
//! | weekday name | next such weekday strictly after today |
//! | by end of day, by eod | today at the end-of-day time (23:59) |
//! | end of week | next Friday, never today |
//! | end of month | last day of the current month |

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

const SATURDAY: i64 = 7;
const FRIDAY: i64 = 6;

/// Calendar rules for turning phrases into dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDatePhraseResolver {
    /// Time used for "today", "tonight" and "tomorrow afternoon/evening"
    pub evening_time: NaiveTime,
    /// Time used for "by end of day" / "by eod"
    pub end_of_day_time: NaiveTime,
}

impl Default for DueDatePhraseResolver {
    fn default() -> Self {
        Self {
            evening_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            end_of_day_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl DueDatePhraseResolver {
    pub fn new(evening_time: NaiveTime, end_of_day_time: NaiveTime) -> Self {
        Self {
            evening_time,
            end_of_day_time,
        }
    }

    /// Resolve a phrase relative to `now`. Unknown phrases resolve to `None`.
    pub fn resolve(&self, phrase: Option<&str>, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let phrase = phrase?.trim().to_lowercase();
        let today = now.date();
        let start_of = |date: NaiveDate| date.and_time(NaiveTime::MIN);

        match phrase.as_str() {
            "today" | "tonight" => Some(today.and_time(self.evening_time)),
            "tomorrow" | "tomorrow morning" => add_days(today, 1).map(start_of),
            "tomorrow afternoon" | "tomorrow evening" => {
                add_days(today, 1).map(|d| d.and_time(self.evening_time))
            }
            "this weekend" => add_days(today, days_until(today, SATURDAY)).map(start_of),
            "next week" => add_days(today, 7).map(start_of),
            "next month" => today.checked_add_months(Months::new(1)).map(start_of),
            "by end of day" | "by eod" => Some(today.and_time(self.end_of_day_time)),
            "end of week" => add_days(today, days_until(today, FRIDAY)).map(start_of),
            "end of month" => last_day_of_month(today).map(start_of),
            name => {
                let target = weekday_from_name(name)?;
                let mut offset = target - weekday_number(today);
                if offset <= 0 {
                    offset += 7;
                }
                add_days(today, offset).map(start_of)
            }
        }
    }
}

/// Resolve with the default calendar rules
pub fn resolve(phrase: Option<&str>, now: NaiveDateTime) -> Option<NaiveDateTime> {
    DueDatePhraseResolver::default().resolve(phrase, now)
}

/// 1 = Sunday .. 7 = Saturday
pub fn weekday_number(date: NaiveDate) -> i64 {
    i64::from(date.weekday().number_from_sunday())
}

/// Weekday number for a lower-case English day name
pub fn weekday_from_name(name: &str) -> Option<i64> {
    match name {
        "sunday" => Some(1),
        "monday" => Some(2),
        "tuesday" => Some(3),
        "wednesday" => Some(4),
        "thursday" => Some(5),
        "friday" => Some(6),
        "saturday" => Some(7),
        _ => None,
    }
}

/// Days until the target weekday, mapping zero to a full week
fn days_until(today: NaiveDate, target: i64) -> i64 {
    match (target - weekday_number(today) + 7) % 7 {
        0 => 7,
        days => days,
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

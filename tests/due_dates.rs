//! Due Date Resolution Integration Tests
//!
//! Phrases are resolved against an injected `now`; these tests pin the
//! calendar rules for each supported phrase.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tasktrack::schedule::{resolve, weekday_number, DueDatePhraseResolver};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn midnight(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
    Some(at(y, m, d, 0, 0))
}

// 2026-01-29 is a Thursday, 2026-02-02 a Monday
const THURSDAY: (i32, u32, u32) = (2026, 1, 29);

fn thursday_morning() -> NaiveDateTime {
    at(THURSDAY.0, THURSDAY.1, THURSDAY.2, 10, 0)
}

#[test]
fn test_tomorrow_is_start_of_next_day() {
    assert_eq!(resolve(Some("tomorrow"), thursday_morning()), midnight(2026, 1, 30));
    assert_eq!(resolve(Some("Tomorrow Morning"), thursday_morning()), midnight(2026, 1, 30));
}

#[test]
fn test_evening_phrases_use_evening_time() {
    let now = thursday_morning();
    assert_eq!(resolve(Some("today"), now), Some(at(2026, 1, 29, 17, 0)));
    assert_eq!(resolve(Some("Tonight"), now), Some(at(2026, 1, 29, 17, 0)));
    assert_eq!(resolve(Some("tomorrow afternoon"), now), Some(at(2026, 1, 30, 17, 0)));
    assert_eq!(resolve(Some("tomorrow evening"), now), Some(at(2026, 1, 30, 17, 0)));
}

#[test]
fn test_by_eod_is_same_day_at_2359() {
    for hour in [0, 9, 17, 23] {
        let now = at(2026, 3, 14, hour, 30);
        assert_eq!(resolve(Some("by eod"), now), Some(at(2026, 3, 14, 23, 59)));
        assert_eq!(resolve(Some("By End Of Day"), now), Some(at(2026, 3, 14, 23, 59)));
    }
}

#[test]
fn test_this_weekend_from_monday_is_five_days_out() {
    let monday = at(2026, 2, 2, 8, 0);
    assert_eq!(monday.weekday(), Weekday::Mon);
    assert_eq!(resolve(Some("this weekend"), monday), midnight(2026, 2, 7));
}

#[test]
fn test_this_weekend_on_saturday_is_next_saturday() {
    let saturday = at(2026, 1, 31, 12, 0);
    assert_eq!(resolve(Some("this weekend"), saturday), midnight(2026, 2, 7));
}

#[test]
fn test_end_of_week_is_next_friday() {
    assert_eq!(resolve(Some("end of week"), thursday_morning()), midnight(2026, 1, 30));

    let friday = at(2026, 1, 30, 9, 0);
    assert_eq!(resolve(Some("end of week"), friday), midnight(2026, 2, 6));
}

#[test]
fn test_weekday_names_are_strictly_after_today() {
    let now = thursday_morning();
    assert_eq!(resolve(Some("friday"), now), midnight(2026, 1, 30));
    assert_eq!(resolve(Some("Sunday"), now), midnight(2026, 2, 1));
    assert_eq!(resolve(Some("monday"), now), midnight(2026, 2, 2));
    assert_eq!(resolve(Some("thursday"), now), midnight(2026, 2, 5));
    assert_eq!(resolve(Some("wednesday"), now), midnight(2026, 2, 4));
}

#[test]
fn test_resolved_weekday_matches_name() {
    let now = thursday_morning();
    for (name, number) in [("sunday", 1), ("monday", 2), ("saturday", 7)] {
        let due = resolve(Some(name), now).unwrap();
        assert_eq!(weekday_number(due.date()), number);
        assert!(due > now);
    }
}

#[test]
fn test_next_week_and_next_month() {
    assert_eq!(resolve(Some("next week"), thursday_morning()), midnight(2026, 2, 5));
    assert_eq!(resolve(Some("next month"), thursday_morning()), midnight(2026, 2, 28));
    assert_eq!(resolve(Some("next month"), at(2026, 3, 15, 9, 0)), midnight(2026, 4, 15));
}

#[test]
fn test_end_of_month_is_last_day_of_current_month() {
    assert_eq!(resolve(Some("end of month"), thursday_morning()), midnight(2026, 1, 31));
    assert_eq!(resolve(Some("end of month"), at(2028, 2, 10, 9, 0)), midnight(2028, 2, 29));
    assert_eq!(resolve(Some("end of month"), at(2026, 12, 31, 9, 0)), midnight(2026, 12, 31));
}

#[test]
fn test_unknown_and_missing_phrases_resolve_to_none() {
    let now = thursday_morning();
    assert_eq!(resolve(None, now), None);
    assert_eq!(resolve(Some(""), now), None);
    assert_eq!(resolve(Some("this week"), now), None);
    assert_eq!(resolve(Some("whenever"), now), None);
}

#[test]
fn test_configured_times_are_used() {
    let resolver = DueDatePhraseResolver::new(
        NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    );
    let now = thursday_morning();

    assert_eq!(resolver.resolve(Some("tonight"), now), Some(at(2026, 1, 29, 18, 30)));
    assert_eq!(resolver.resolve(Some("by eod"), now), Some(at(2026, 1, 29, 22, 0)));
    assert_eq!(resolver.resolve(Some("tomorrow"), now), midnight(2026, 1, 30));
}

#[test]
fn test_year_rollover() {
    let new_years_eve = at(2026, 12, 31, 20, 0);
    assert_eq!(resolve(Some("tomorrow"), new_years_eve), midnight(2027, 1, 1));
    assert_eq!(resolve(Some("next week"), new_years_eve), midnight(2027, 1, 7));
}

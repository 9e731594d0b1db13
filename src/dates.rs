//! Date labelling and due-date ordering for task lists.
//!
//! Calendar comparisons use the local time zone. Each helper that depends on
//! the current moment has an `_at` variant taking `now` explicitly.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, SubsecRound, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::task::Task;

/// Current time at the stored precision (milliseconds)
pub fn now() -> DateTime<Utc> {
    normalize(Utc::now())
}

/// Truncate to the canonical stored precision (milliseconds)
pub fn normalize(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Parse a due date given as RFC 3339 or `YYYY-MM-DD` (local midnight)
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(normalize(value.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid date '{trimmed}' (expected YYYY-MM-DD or RFC 3339)"
        ))
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or_else(|| Error::InvalidArgument(format!("date '{trimmed}' has no local midnight")))?;
    Ok(normalize(midnight.with_timezone(&Utc)))
}

/// "Today", "Tomorrow", a weekday name within the current week, else "Jan 05"
pub fn format_relative(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => format_relative_at(&date.with_timezone(&Local), &Local::now()),
        None => String::new(),
    }
}

pub fn format_relative_at<Tz>(date: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let day = date.date_naive();
    let today = now.date_naive();

    if day == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(day) {
        return "Tomorrow".to_string();
    }
    if same_week(day, today) {
        return date.format("%A").to_string();
    }
    date.format("%b %d").to_string()
}

/// "Jan 05, 2026"; empty for no date
pub fn format_full(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => format_full_in(&date.with_timezone(&Local)),
        None => String::new(),
    }
}

pub fn format_full_in<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %d, %Y").to_string()
}

/// Strictly in the past and not on today's calendar day
pub fn is_overdue(date: Option<&DateTime<Utc>>) -> bool {
    match date {
        Some(date) => is_overdue_at(&date.with_timezone(&Local), &Local::now()),
        None => false,
    }
}

pub fn is_overdue_at<Tz: TimeZone>(date: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
    date < now && date.date_naive() != now.date_naive()
}

/// Stable ascending sort by due date; tasks without one go last
pub fn sort_by_due_date(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|left, right| compare_due(left.due_date.as_ref(), right.due_date.as_ref()));
    sorted
}

fn compare_due(left: Option<&DateTime<Utc>>, right: Option<&DateTime<Utc>>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Weeks start on Sunday.
fn same_week(day: NaiveDate, today: NaiveDate) -> bool {
    week_start(day) == week_start(today)
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

const WEEKDAYS_DE: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Every civil date from `start` to `end`, both included.
///
/// Dates carry no clock or offset, so a DST shift cannot skip or repeat a day.
pub fn each_day_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// First and last instant of `date`, the last one at millisecond resolution.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = date.and_time(NaiveTime::MIN);
    let to = date.and_time(
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    );
    (from, to)
}

pub fn weekday_german(weekday: Weekday) -> &'static str {
    WEEKDAYS_DE[weekday.num_days_from_monday() as usize]
}

pub fn weekday_of(date: NaiveDate) -> &'static str {
    weekday_german(date.weekday())
}

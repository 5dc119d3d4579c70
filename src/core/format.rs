//! Canonical digest texts. Existing digests depend on these strings, so they
//! are reproduced byte for byte.

use crate::core::calendar::weekday_of;
use crate::domain::model::{DayRecord, Interval, Reporter};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

pub const WHOLE_DAY: &str = "ganztägig";
pub const DAY_HEADER_MARKER: &str = "— Abmeldungen für diesen Tag —";
pub const DAY_PLACEHOLDER: &str = "(Einträge werden automatisch ergänzt.)";
pub const EMPTY_REASON: &str = "—";
pub const SUBMISSION_ACK: &str = "Abwesenheit eingetragen. Danke!";

/// Time window of an absence within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLabel {
    WholeDay,
    Partial {
        from: (u32, u32),
        to: (u32, u32),
    },
}

impl WindowLabel {
    /// Label for a clipped window; `00:00`–`23:59` collapses to a whole day.
    pub fn from_clipped(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        let from = (from.hour(), from.minute());
        let to = (to.hour(), to.minute());
        if from == (0, 0) && to == (23, 59) {
            WindowLabel::WholeDay
        } else {
            WindowLabel::Partial { from, to }
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowLabel::WholeDay => f.write_str(WHOLE_DAY),
            WindowLabel::Partial { from, to } => write!(
                f,
                "{:02}:{:02}–{:02}:{:02}",
                from.0, from.1, to.0, to.1
            ),
        }
    }
}

pub fn german_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn german_date_time(at: NaiveDateTime) -> String {
    at.format("%d.%m.%Y %H:%M").to_string()
}

fn reason_or_dash(reason: &str) -> &str {
    let reason = reason.trim();
    if reason.is_empty() {
        EMPTY_REASON
    } else {
        reason
    }
}

/// Fresh record for a day with no entries yet.
pub fn day_record(date: NaiveDate) -> DayRecord {
    DayRecord {
        title: format!("📅 {}, {}", weekday_of(date), german_date(date)),
        description: [DAY_HEADER_MARKER, DAY_PLACEHOLDER].join("\n"),
    }
}

pub fn absence_line(reporter: &Reporter, label: WindowLabel, reason: &str) -> String {
    format!(
        "• {} — {} (Grund: {})",
        reporter.mention(),
        label,
        reason_or_dash(reason)
    )
}

/// Body after appending `line`. Bodies without the header marker are trimmed.
pub fn append_to_body(body: &str, line: &str) -> String {
    let joined = format!("{}\n{}", body, line);
    if body.contains(DAY_HEADER_MARKER) {
        joined
    } else {
        joined.trim().to_string()
    }
}

pub fn range_summary(interval: &Interval) -> String {
    if interval.has_explicit_times() {
        format!(
            "{} - {}",
            german_date_time(interval.start()),
            german_date_time(interval.end())
        )
    } else if interval.start_day() == interval.end_day() {
        format!("{} ({})", german_date(interval.start_day()), WHOLE_DAY)
    } else {
        format!(
            "{} - {} ({})",
            german_date(interval.start_day()),
            german_date(interval.end_day()),
            WHOLE_DAY
        )
    }
}

/// Announcement posted once per submission.
pub fn announcement(reporter: &Reporter, interval: &Interval, reason: &str) -> String {
    [
        format!("• **Name:** {}", reporter.mention()),
        format!("• **Zeitraum:** {}", range_summary(interval)),
        format!("• **Grund:** {}", reason_or_dash(reason)),
    ]
    .join("\n")
}

//! Parser for German-style absence ranges.
//!
//! Accepted forms, after whitespace normalization:
//! - `TT.MM.JJJJ`
//! - `TT.MM.JJJJ HH:MM`
//! - `TT.MM.JJJJ[ HH:MM] - TT.MM.JJJJ[ HH:MM]`
//! - `TT.MM.JJJJ[ HH:MM] - HH:MM` (end on the start day)
//!
//! All fields have fixed widths. Text is first matched into a [`RangeExpr`]
//! and then resolved into an [`Interval`], so calendar checks and defaults
//! live in one place.

use crate::domain::model::Interval;
use crate::utils::error::ParseError;
use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Words that mark an open-ended absence.
pub const INDEFINITE_MARKERS: [&str; 3] = ["unbestimmt", "unbefristet", "unendlich"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub time: Option<ClockTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Date(DateToken),
    SameDay(ClockTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeExpr {
    Single(DateToken),
    Range { start: DateToken, end: RangeEnd },
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{:04}", self.day, self.month, self.year)?;
        if let Some(time) = self.time {
            write!(f, " {}", time)?;
        }
        Ok(())
    }
}

struct Grammar {
    single: Regex,
    range: Regex,
    whitespace: Regex,
    indefinite: Regex,
}

fn grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        const DATE: &str = r"([0-9]{2})\.([0-9]{2})\.([0-9]{4})";
        const OPT_TIME: &str = r"(?: ([0-9]{2}):([0-9]{2}))?";
        let start = format!("{}{}", DATE, OPT_TIME);
        Grammar {
            single: Regex::new(&format!("^{}$", start)).expect("single-day grammar"),
            range: Regex::new(&format!(
                r"^{start}\s*-\s*(?:{DATE}{OPT_TIME}|([0-9]{{2}}):([0-9]{{2}}))$"
            ))
            .expect("range grammar"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern"),
            indefinite: Regex::new(&format!("(?i){}", INDEFINITE_MARKERS.join("|")))
                .expect("indefinite markers"),
        }
    })
}

/// Parses raw range text into a validated interval.
pub fn parse(raw: &str) -> Result<Interval, ParseError> {
    reject_indefinite(raw)?;
    let normalized = normalize(raw);
    let expr = parse_expr(&normalized)?;
    tracing::debug!(input = %normalized, ?expr, "matched absence range");
    resolve(&expr)
}

/// Trims and collapses internal whitespace runs into single spaces.
pub fn normalize(raw: &str) -> String {
    grammar()
        .whitespace
        .replace_all(raw.trim(), " ")
        .into_owned()
}

/// Empty text counts as "no concrete range" as well.
pub fn reject_indefinite(raw: &str) -> Result<(), ParseError> {
    if raw.trim().is_empty() || grammar().indefinite.is_match(raw) {
        return Err(ParseError::IndefiniteNotAllowed);
    }
    Ok(())
}

pub fn parse_expr(normalized: &str) -> Result<RangeExpr, ParseError> {
    let g = grammar();

    if let Some(caps) = g.single.captures(normalized) {
        return Ok(RangeExpr::Single(date_token(&caps, 1)?));
    }

    if let Some(caps) = g.range.captures(normalized) {
        let start = date_token(&caps, 1)?;
        let end = if caps.get(6).is_some() {
            RangeEnd::Date(date_token(&caps, 6)?)
        } else {
            RangeEnd::SameDay(ClockTime {
                hour: number(&caps, 11)?,
                minute: number(&caps, 12)?,
            })
        };
        return Ok(RangeExpr::Range { start, end });
    }

    Err(ParseError::MalformedInput)
}

/// Applies the time defaults and builds the interval.
pub fn resolve(expr: &RangeExpr) -> Result<Interval, ParseError> {
    const DAY_START: ClockTime = ClockTime { hour: 0, minute: 0 };
    const DAY_END: ClockTime = ClockTime {
        hour: 23,
        minute: 59,
    };

    match *expr {
        RangeExpr::Single(token) => match token.time {
            None => Interval::new(
                instant(&token, DAY_START)?,
                instant(&token, DAY_END)?,
                false,
            ),
            // A timed single day is a zero-length interval at that minute.
            Some(time) => {
                let at = instant(&token, time)?;
                Interval::new(at, at, true)
            }
        },
        RangeExpr::Range { start, end } => {
            let from = instant(&start, start.time.unwrap_or(DAY_START))?;
            match end {
                RangeEnd::Date(end_token) => Interval::new(
                    from,
                    instant(&end_token, end_token.time.unwrap_or(DAY_END))?,
                    start.time.is_some() || end_token.time.is_some(),
                ),
                RangeEnd::SameDay(time) => Interval::new(from, instant(&start, time)?, true),
            }
        }
    }
}

fn instant(token: &DateToken, time: ClockTime) -> Result<NaiveDateTime, ParseError> {
    let date = NaiveDate::from_ymd_opt(token.year, token.month, token.day).ok_or_else(|| {
        ParseError::InvalidDate {
            value: DateToken { time: None, ..*token }.to_string(),
        }
    })?;
    date.and_hms_opt(time.hour, time.minute, 0)
        .ok_or_else(|| ParseError::InvalidDate {
            value: time.to_string(),
        })
}

fn date_token(caps: &Captures<'_>, first: usize) -> Result<DateToken, ParseError> {
    let time = if caps.get(first + 3).is_some() {
        Some(ClockTime {
            hour: number(caps, first + 3)?,
            minute: number(caps, first + 4)?,
        })
    } else {
        None
    };
    Ok(DateToken {
        day: number(caps, first)?,
        month: number(caps, first + 1)?,
        year: number(caps, first + 2)? as i32,
        time,
    })
}

fn number(caps: &Captures<'_>, index: usize) -> Result<u32, ParseError> {
    caps.get(index)
        .ok_or(ParseError::MalformedInput)?
        .as_str()
        .parse()
        .map_err(|_| ParseError::MalformedInput)
}

use crate::utils::error::ParseError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A validated absence period in naive local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
    has_explicit_times: bool,
}

impl Interval {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        has_explicit_times: bool,
    ) -> std::result::Result<Self, ParseError> {
        if end < start {
            return Err(ParseError::EndBeforeStart);
        }
        Ok(Self {
            start,
            end,
            has_explicit_times,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// True when either endpoint was written with an `HH:MM` component.
    pub fn has_explicit_times(&self) -> bool {
        self.has_explicit_times
    }

    pub fn start_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_day(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Year and 1-based month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("month key '{}' is not YYYY-MM", s))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("month key '{}' is not YYYY-MM", s));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("month key '{}' has a non-numeric year", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("month key '{}' has a non-numeric month", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month key '{}' is out of range", s))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Identifier of a day record, owned by the messaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordHandle(String);

impl RecordHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Day-of-month to record handle, for one month.
pub type MonthMap = BTreeMap<u32, RecordHandle>;

/// Durable mapping of every scaffolded month to its day records.
///
/// Unknown top-level fields of an existing state file are kept in `extra`
/// and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigestState {
    #[serde(rename = "monthMaps", default, deserialize_with = "deserialize_month_maps")]
    pub month_maps: BTreeMap<MonthKey, MonthMap>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Day keys are read as strings and parsed here, since `flatten` buffers the
/// document and loses serde_json's integer map key support.
fn deserialize_month_maps<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<MonthKey, MonthMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<MonthKey, BTreeMap<String, RecordHandle>>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, days)| {
            let days = days
                .into_iter()
                .map(|(day, handle)| match day.parse::<u32>() {
                    Ok(day) if (1..=31).contains(&day) => Ok((day, handle)),
                    _ => Err(de::Error::custom(format!(
                        "invalid day '{}' in month {}",
                        day, key
                    ))),
                })
                .collect::<std::result::Result<MonthMap, D::Error>>()?;
            Ok((key, days))
        })
        .collect()
}

impl DigestState {
    pub fn handle(&self, key: &MonthKey, day: u32) -> Option<&RecordHandle> {
        self.month_maps.get(key).and_then(|month| month.get(&day))
    }

    pub fn has_month(&self, key: &MonthKey) -> bool {
        self.month_maps.contains_key(key)
    }

    pub fn month(&self, key: &MonthKey) -> Option<&MonthMap> {
        self.month_maps.get(key)
    }

    /// Registers `handle` for the day unless one is already present.
    /// Returns whether the entry was added.
    pub fn register(&mut self, key: MonthKey, day: u32, handle: RecordHandle) -> bool {
        let month = self.month_maps.entry(key).or_default();
        if month.contains_key(&day) {
            return false;
        }
        month.insert(day, handle);
        true
    }
}

/// Content of one day record: a title and a running body of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub title: String,
    pub description: String,
}

/// Platform user id of the person announcing an absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter(String);

impl Reporter {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub range_text: String,
    pub reporter: Reporter,
    pub reason: String,
}

use crate::core::calendar::{day_bounds, each_day_inclusive};
use crate::core::format::{absence_line, WindowLabel};
use crate::core::scaffold;
use crate::domain::model::{Interval, RecordHandle, Reporter};
use crate::domain::ports::DayRecordStore;
use crate::utils::error::{DigestError, Result};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub label: WindowLabel,
    pub handle: RecordHandle,
    pub line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub appended: Vec<DayEntry>,
    pub skipped: Vec<NaiveDate>,
}

/// Window of `interval` on `date`, or `None` when they do not overlap.
pub fn day_window(interval: &Interval, date: NaiveDate) -> Option<WindowLabel> {
    if !interval.has_explicit_times() {
        return Some(WindowLabel::WholeDay);
    }
    let (day_start, day_end) = day_bounds(date);
    let from = interval.start().max(day_start);
    let to = interval.end().min(day_end);
    (from <= to).then(|| WindowLabel::from_clipped(from, to))
}

/// Writes one line per covered day into the day records of `store`.
pub struct DailyAggregator<S: DayRecordStore> {
    store: S,
}

impl<S: DayRecordStore> DailyAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Processes days in ascending order and stops at the first failing day.
    /// Days appended before the failure stay appended.
    pub async fn aggregate(
        &self,
        interval: &Interval,
        reporter: &Reporter,
        reason: &str,
    ) -> Result<AggregationReport> {
        let mut report = AggregationReport::default();

        for date in each_day_inclusive(interval.start_day(), interval.end_day()) {
            let Some(label) = day_window(interval, date) else {
                tracing::debug!(%date, "interval does not overlap day, skipping");
                report.skipped.push(date);
                continue;
            };

            let line = absence_line(reporter, label, reason);
            let handle = self
                .store
                .ensure_day(date.year(), date.month(), date.day())
                .await
                .map_err(|e| store_failure(date, e))?;
            self.store
                .append_line(&handle, &line)
                .await
                .map_err(|e| store_failure(date, e))?;

            tracing::debug!(%date, %handle, %label, "appended absence line");
            report.appended.push(DayEntry {
                date,
                label,
                handle,
                line,
            });
        }

        tracing::info!(
            reporter = reporter.id(),
            days = report.appended.len(),
            "absence aggregated"
        );
        Ok(report)
    }

    pub async fn ensure_month(&self, year: i32, month: u32) -> Result<()> {
        scaffold::ensure_month(&self.store, year, month).await
    }
}

fn store_failure(date: NaiveDate, source: DigestError) -> DigestError {
    tracing::warn!(%date, error = %source, "day record update failed");
    DigestError::StoreFailure {
        date,
        source: Box::new(source),
    }
}

use crate::core::aggregator::{AggregationReport, DailyAggregator};
use crate::core::format::{announcement, SUBMISSION_ACK};
use crate::core::parser;
use crate::domain::model::{Interval, MonthKey, Submission};
use crate::domain::ports::{DayRecordStore, MessageChannel};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub interval: Interval,
    pub announcement: String,
    pub report: AggregationReport,
}

impl SubmissionReceipt {
    pub fn acknowledgement(&self) -> &'static str {
        SUBMISSION_ACK
    }
}

/// Accepts absence submissions: announces them and updates the day digest.
pub struct SubmissionService<A: MessageChannel, S: DayRecordStore> {
    announcements: A,
    aggregator: DailyAggregator<S>,
    scaffold_month: Option<MonthKey>,
}

impl<A: MessageChannel, S: DayRecordStore> SubmissionService<A, S> {
    pub fn new(announcements: A, records: S) -> Self {
        Self {
            announcements,
            aggregator: DailyAggregator::new(records),
            scaffold_month: None,
        }
    }

    /// Scaffolds `month` on every accepted submission, before it is recorded.
    pub fn with_scaffold_month(mut self, month: MonthKey) -> Self {
        self.scaffold_month = Some(month);
        self
    }

    pub fn aggregator(&self) -> &DailyAggregator<S> {
        &self.aggregator
    }

    /// Parsing failures are returned before any channel or store is touched.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt> {
        let interval = parser::parse(&submission.range_text)?;
        let reason = submission.reason.trim();

        if let Some(month) = self.scaffold_month {
            self.aggregator
                .ensure_month(month.year(), month.month())
                .await?;
        }

        let text = announcement(&submission.reporter, &interval, reason);
        self.announcements.send_text(&text).await?;

        let report = self
            .aggregator
            .aggregate(&interval, &submission.reporter, reason)
            .await?;

        Ok(SubmissionReceipt {
            interval,
            announcement: text,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryChannel, MemoryStateStore};
    use crate::core::day_records::ChannelDayRecordStore;
    use crate::domain::model::Reporter;
    use crate::domain::ports::StateStore;
    use crate::utils::error::{DigestError, ParseError};

    fn submission(range: &str, reason: &str) -> Submission {
        Submission {
            range_text: range.to_string(),
            reporter: Reporter::new("55"),
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_announces_and_aggregates() {
        let announcements = MemoryChannel::new();
        let overview = MemoryChannel::new();
        let records = ChannelDayRecordStore::new(overview.clone(), MemoryStateStore::new());
        let service = SubmissionService::new(announcements.clone(), records);

        let receipt = service
            .submit(&submission("17.11.2025 09:00 - 16:00", " Arzttermin "))
            .await
            .unwrap();

        assert_eq!(receipt.acknowledgement(), "Abwesenheit eingetragen. Danke!");
        assert_eq!(
            announcements.texts().await,
            vec!["• **Name:** <@55>\n• **Zeitraum:** 17.11.2025 09:00 - 17.11.2025 16:00\n• **Grund:** Arzttermin"]
        );
        assert_eq!(receipt.report.appended.len(), 1);
        let handle = &receipt.report.appended[0].handle;
        let body = service.aggregator().store().get(handle).await.unwrap();
        assert!(body.ends_with("\n• <@55> — 09:00–16:00 (Grund: Arzttermin)"));
    }

    #[tokio::test]
    async fn test_parse_error_touches_nothing() {
        let announcements = MemoryChannel::new();
        let overview = MemoryChannel::new();
        let state = MemoryStateStore::new();
        let records = ChannelDayRecordStore::new(overview.clone(), state.clone());
        let service = SubmissionService::new(announcements.clone(), records);

        let err = service
            .submit(&submission("ab sofort unbefristet", "x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DigestError::Parse(ParseError::IndefiniteNotAllowed)
        ));
        assert!(announcements.texts().await.is_empty());
        assert_eq!(overview.record_count().await, 0);
        assert_eq!(state.save_count().await, 0);
        assert!(state.load().await.unwrap().month_maps.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_range_skips_month_scaffold() {
        let overview = MemoryChannel::new();
        let state = MemoryStateStore::new();
        let records = ChannelDayRecordStore::new(overview.clone(), state.clone());
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let service = SubmissionService::new(MemoryChannel::new(), records)
            .with_scaffold_month(MonthKey::from(today));

        let err = service
            .submit(&submission("morgen", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, DigestError::Parse(ParseError::MalformedInput)));
        assert_eq!(
            err.user_friendly_message(),
            ParseError::MalformedInput.user_message()
        );
        assert_eq!(overview.record_count().await, 0);
        assert_eq!(state.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_accepted_range_scaffolds_month_first() {
        let overview = MemoryChannel::new();
        let state = MemoryStateStore::new();
        let records = ChannelDayRecordStore::new(overview.clone(), state.clone());
        let service = SubmissionService::new(MemoryChannel::new(), records)
            .with_scaffold_month(MonthKey::new(2026, 10).unwrap());

        service
            .submit(&submission("02.11.2026", "Urlaub"))
            .await
            .unwrap();

        let titles = overview.record_titles().await;
        assert_eq!(titles.len(), 31 + 30);
        assert_eq!(titles[0], "📅 Donnerstag, 01.10.2026");
        assert_eq!(titles[31], "📅 Sonntag, 01.11.2026");
        let loaded = state.load().await.unwrap();
        assert!(loaded.has_month(&MonthKey::new(2026, 10).unwrap()));
        assert!(loaded.has_month(&MonthKey::new(2026, 11).unwrap()));
    }
}

use crate::core::calendar::days_in_month;
use crate::core::format::{append_to_body, day_record};
use crate::domain::model::{MonthKey, RecordHandle};
use crate::domain::ports::{DayRecordStore, MessageChannel, StateStore};
use crate::utils::error::{DigestError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Day records kept as editable posts in a channel, indexed by the state store.
///
/// A day without a record causes every missing day of its month to be
/// created, in ascending order, so the first touch of a month scaffolds it
/// completely and an interrupted scaffold is completed later. The state is
/// loaded at the start of each `ensure_day` and saved after every created
/// record, so a crash leaves all earlier records registered.
pub struct ChannelDayRecordStore<C: MessageChannel, T: StateStore> {
    channel: C,
    state: T,
}

impl<C: MessageChannel, T: StateStore> ChannelDayRecordStore<C, T> {
    pub fn new(channel: C, state: T) -> Self {
        Self { channel, state }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn state(&self) -> &T {
        &self.state
    }
}

#[async_trait]
impl<C: MessageChannel, T: StateStore> DayRecordStore for ChannelDayRecordStore<C, T> {
    async fn ensure_day(&self, year: i32, month: u32, day: u32) -> Result<RecordHandle> {
        let invalid = || DigestError::InvalidDay { year, month, day };
        let key = MonthKey::new(year, month).ok_or_else(invalid)?;
        let last_day = days_in_month(year, month).ok_or_else(invalid)?;
        if !(1..=last_day).contains(&day) {
            return Err(invalid());
        }

        let mut state = self.state.load().await?;
        if let Some(handle) = state.handle(&key, day) {
            return Ok(handle.clone());
        }

        if !state.has_month(&key) {
            tracing::info!(month = %key, "scaffolding day records for new month");
        }

        for d in 1..=last_day {
            if state.handle(&key, d).is_some() {
                continue;
            }
            let date = NaiveDate::from_ymd_opt(year, month, d).ok_or_else(invalid)?;
            let handle = self.channel.send_record(&day_record(date)).await?;
            state.register(key, d, handle.clone());
            self.state.save(&state).await?;
            tracing::debug!(%date, %handle, "day record created");
        }

        state.handle(&key, day).cloned().ok_or_else(invalid)
    }

    async fn append_line(&self, handle: &RecordHandle, line: &str) -> Result<()> {
        let mut record = self.channel.fetch_record(handle).await?;
        record.description = append_to_body(&record.description, line);
        self.channel.edit_record(handle, &record).await
    }

    async fn get(&self, handle: &RecordHandle) -> Result<String> {
        Ok(self.channel.fetch_record(handle).await?.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryChannel, MemoryStateStore};
    use crate::core::format::DAY_HEADER_MARKER;

    fn store() -> ChannelDayRecordStore<MemoryChannel, MemoryStateStore> {
        ChannelDayRecordStore::new(MemoryChannel::new(), MemoryStateStore::new())
    }

    #[tokio::test]
    async fn test_first_touch_scaffolds_whole_month() {
        let store = store();
        let handle = store.ensure_day(2025, 11, 17).await.unwrap();

        let state = store.state().load().await.unwrap();
        let key = MonthKey::new(2025, 11).unwrap();
        assert_eq!(state.month(&key).unwrap().len(), 30);
        assert_eq!(state.handle(&key, 17), Some(&handle));
        assert_eq!(store.channel().record_count().await, 30);
        // One save per created record.
        assert_eq!(store.state().save_count().await, 30);

        let titles = store.channel().record_titles().await;
        assert_eq!(titles[0], "📅 Samstag, 01.11.2025");
        assert_eq!(titles[29], "📅 Sonntag, 30.11.2025");
    }

    #[tokio::test]
    async fn test_ensure_day_is_idempotent() {
        let store = store();
        let first = store.ensure_day(2025, 11, 17).await.unwrap();
        let second = store.ensure_day(2025, 11, 17).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.channel().record_count().await, 30);
    }

    #[tokio::test]
    async fn test_missing_day_in_known_month_is_created_alone() {
        let store = store();
        store.ensure_day(2025, 11, 1).await.unwrap();

        let key = MonthKey::new(2025, 11).unwrap();
        let mut state = store.state().load().await.unwrap();
        state.month_maps.get_mut(&key).unwrap().remove(&12);
        store.state().save(&state).await.unwrap();

        let handle = store.ensure_day(2025, 11, 12).await.unwrap();
        assert_eq!(store.channel().record_count().await, 31);
        let state = store.state().load().await.unwrap();
        assert_eq!(state.handle(&key, 12), Some(&handle));
    }

    #[tokio::test]
    async fn test_rejects_day_outside_month() {
        let store = store();
        assert!(matches!(
            store.ensure_day(2025, 2, 29).await,
            Err(DigestError::InvalidDay { day: 29, .. })
        ));
        assert!(matches!(
            store.ensure_day(2025, 0, 1).await,
            Err(DigestError::InvalidDay { .. })
        ));
        assert_eq!(store.channel().record_count().await, 0);
    }

    #[tokio::test]
    async fn test_append_keeps_header_and_order() {
        let store = store();
        let handle = store.ensure_day(2025, 11, 17).await.unwrap();
        store.append_line(&handle, "• a").await.unwrap();
        store.append_line(&handle, "• b").await.unwrap();

        let body = store.get(&handle).await.unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], DAY_HEADER_MARKER);
        assert_eq!(&lines[2..], ["• a", "• b"]);
    }

    #[tokio::test]
    async fn test_append_to_deleted_record_fails() {
        let store = store();
        let handle = store.ensure_day(2025, 11, 17).await.unwrap();
        store.channel().delete(&handle).await;

        assert!(matches!(
            store.append_line(&handle, "• a").await,
            Err(DigestError::RecordNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_scaffold_failure_keeps_created_days() {
        let store = ChannelDayRecordStore::new(
            MemoryChannel::failing_after(5),
            MemoryStateStore::new(),
        );
        assert!(store.ensure_day(2025, 11, 17).await.is_err());

        let state = store.state().load().await.unwrap();
        let key = MonthKey::new(2025, 11).unwrap();
        let days: Vec<u32> = state.month(&key).unwrap().keys().copied().collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_interrupted_scaffold_is_completed_on_next_touch() {
        let state = MemoryStateStore::new();
        let broken = ChannelDayRecordStore::new(MemoryChannel::failing_after(5), state.clone());
        assert!(broken.ensure_day(2025, 11, 17).await.is_err());

        let store = ChannelDayRecordStore::new(MemoryChannel::new(), state);
        store.ensure_day(2025, 11, 2).await.unwrap();
        // Day 2 already existed; nothing new is created.
        assert_eq!(store.channel().record_count().await, 0);

        store.ensure_day(2025, 11, 17).await.unwrap();
        assert_eq!(store.channel().record_count().await, 25);
        let key = MonthKey::new(2025, 11).unwrap();
        let loaded = store.state().load().await.unwrap();
        assert_eq!(loaded.month(&key).unwrap().len(), 30);
    }
}

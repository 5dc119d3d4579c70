use crate::core::calendar::days_in_month;
use crate::domain::ports::DayRecordStore;
use crate::utils::error::{DigestError, Result};

/// Makes sure every day of the month has a record, in ascending day order.
/// Days that already have one are left untouched.
pub async fn ensure_month<S: DayRecordStore + ?Sized>(
    store: &S,
    year: i32,
    month: u32,
) -> Result<()> {
    let last_day = days_in_month(year, month).ok_or(DigestError::InvalidDay {
        year,
        month,
        day: 1,
    })?;

    for day in 1..=last_day {
        store.ensure_day(year, month, day).await?;
    }

    tracing::debug!(year, month, days = last_day, "month scaffold ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordHandle;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct CountingStore {
        calls: Arc<Mutex<Vec<u32>>>,
    }

    #[async_trait]
    impl DayRecordStore for CountingStore {
        async fn ensure_day(&self, _year: i32, _month: u32, day: u32) -> Result<RecordHandle> {
            self.calls.lock().await.push(day);
            Ok(RecordHandle::new(day.to_string()))
        }

        async fn append_line(&self, _handle: &RecordHandle, _line: &str) -> Result<()> {
            Ok(())
        }

        async fn get(&self, _handle: &RecordHandle) -> Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_ensure_month_visits_every_day_in_order() {
        let store = CountingStore::default();
        ensure_month(&store, 2024, 2).await.unwrap();
        let calls = store.calls.lock().await;
        assert_eq!(*calls, (1..=29).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_ensure_month_rejects_invalid_month() {
        let store = CountingStore::default();
        assert!(matches!(
            ensure_month(&store, 2025, 13).await,
            Err(DigestError::InvalidDay { month: 13, .. })
        ));
    }
}

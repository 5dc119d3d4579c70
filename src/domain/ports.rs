use crate::domain::model::{DayRecord, DigestState, RecordHandle};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Whole-document persistence of the month maps.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<DigestState>;
    async fn save(&self, state: &DigestState) -> Result<()>;
}

/// A messaging channel that can hold plain posts and editable records.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_text(&self, content: &str) -> Result<RecordHandle>;
    async fn send_record(&self, record: &DayRecord) -> Result<RecordHandle>;
    async fn fetch_record(&self, handle: &RecordHandle) -> Result<DayRecord>;
    async fn edit_record(&self, handle: &RecordHandle, record: &DayRecord) -> Result<()>;
}

#[async_trait]
pub trait DayRecordStore: Send + Sync {
    /// Returns the record for the day, creating and registering it first if
    /// the day has none yet.
    async fn ensure_day(&self, year: i32, month: u32, day: u32) -> Result<RecordHandle>;

    /// Appends `line` to the end of the record body.
    async fn append_line(&self, handle: &RecordHandle, line: &str) -> Result<()>;

    /// Current body text of the record.
    async fn get(&self, handle: &RecordHandle) -> Result<String>;
}

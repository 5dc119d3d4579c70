//! In-process channel and state store, used by tests and dry runs.

use crate::domain::model::{DayRecord, DigestState, RecordHandle};
use crate::domain::ports::{MessageChannel, StateStore};
use crate::utils::error::{DigestError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct ChannelInner {
    next_id: u64,
    texts: Vec<String>,
    records: BTreeMap<u64, DayRecord>,
    records_left: Option<usize>,
}

#[derive(Clone, Default)]
pub struct MemoryChannel {
    inner: Arc<Mutex<ChannelInner>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel that rejects every record after the first `records`.
    pub fn failing_after(records: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelInner {
                records_left: Some(records),
                ..ChannelInner::default()
            })),
        }
    }

    pub async fn texts(&self) -> Vec<String> {
        self.inner.lock().await.texts.clone()
    }

    pub async fn record_count(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Record titles in creation order.
    pub async fn record_titles(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.records.values().map(|r| r.title.clone()).collect()
    }

    /// Removes a record as if it had been deleted out of band.
    pub async fn delete(&self, handle: &RecordHandle) -> bool {
        let mut inner = self.inner.lock().await;
        match parse_id(handle) {
            Ok(id) => inner.records.remove(&id).is_some(),
            Err(_) => false,
        }
    }
}

fn parse_id(handle: &RecordHandle) -> Result<u64> {
    handle
        .as_str()
        .parse()
        .map_err(|_| DigestError::RecordNotFound {
            handle: handle.to_string(),
        })
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn send_text(&self, content: &str) -> Result<RecordHandle> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        inner.texts.push(content.to_string());
        Ok(RecordHandle::new(inner.next_id.to_string()))
    }

    async fn send_record(&self, record: &DayRecord) -> Result<RecordHandle> {
        let mut inner = self.inner.lock().await;
        if let Some(left) = inner.records_left.as_mut() {
            if *left == 0 {
                return Err(DigestError::ChannelError {
                    message: "channel refused the record".to_string(),
                });
            }
            *left -= 1;
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.insert(id, record.clone());
        Ok(RecordHandle::new(id.to_string()))
    }

    async fn fetch_record(&self, handle: &RecordHandle) -> Result<DayRecord> {
        let id = parse_id(handle)?;
        let inner = self.inner.lock().await;
        inner
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| DigestError::RecordNotFound {
                handle: handle.to_string(),
            })
    }

    async fn edit_record(&self, handle: &RecordHandle, record: &DayRecord) -> Result<()> {
        let id = parse_id(handle)?;
        let mut inner = self.inner.lock().await;
        match inner.records.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(DigestError::RecordNotFound {
                handle: handle.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct StateInner {
    state: DigestState,
    saves: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<StateInner>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save_count(&self) -> usize {
        self.inner.lock().await.saves
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<DigestState> {
        Ok(self.inner.lock().await.state.clone())
    }

    async fn save(&self, state: &DigestState) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.state = state.clone();
        inner.saves += 1;
        Ok(())
    }
}

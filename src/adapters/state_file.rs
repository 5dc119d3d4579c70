use crate::domain::model::DigestState;
use crate::domain::ports::{StateStore, Storage};
use crate::utils::error::{DigestError, Result};
use async_trait::async_trait;

pub const DEFAULT_STATE_FILE: &str = "state.json";

/// The month maps as one pretty-printed JSON document.
///
/// Every save rewrites the whole file; concurrent writers lose updates.
pub struct JsonStateStore<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> JsonStateStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> StateStore for JsonStateStore<S> {
    async fn load(&self) -> Result<DigestState> {
        match self.storage.read_file(&self.file_name).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(DigestError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(file = %self.file_name, "no state file yet, starting empty");
                Ok(DigestState::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, state: &DigestState) -> Result<()> {
        let data = serde_json::to_vec_pretty(state)?;
        self.storage.write_file(&self.file_name, &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local_storage::LocalStorage;
    use crate::domain::model::{MonthKey, RecordHandle};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonStateStore<LocalStorage> {
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        JsonStateStore::new(storage, DEFAULT_STATE_FILE)
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let state = store(&dir).load().await.unwrap();
        assert!(state.month_maps.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut state = DigestState::default();
        let key = MonthKey::new(2025, 11).unwrap();
        state.register(key, 17, RecordHandle::new("1234"));
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);

        let raw = std::fs::read_to_string(dir.path().join(DEFAULT_STATE_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["monthMaps"]["2025-11"]["17"], "1234");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_STATE_FILE), "{ not json").unwrap();
        assert!(matches!(
            store(&dir).load().await,
            Err(DigestError::SerializationError(_))
        ));
    }
}

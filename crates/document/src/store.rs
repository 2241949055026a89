use serde::{Deserialize, Serialize};

use crate::{DocumentError, Landmark, Road};

/// Fixed key the offline draft lives under in the local key-value store.
pub const OFFLINE_DRAFT_KEY: &str = "campus-map.offline-draft";

/// The crash-safety copy of unsaved work: just roads and landmarks,
/// written on edit, restored on startup, cleared after a successful
/// remote save or load.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineDraft {
    #[serde(default)]
    pub roads: Vec<Road>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl OfflineDraft {
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty() && self.landmarks.is_empty()
    }
}

/// Local key-value persistence for the offline draft.
pub trait DraftStore {
    fn load(&self) -> Result<Option<OfflineDraft>, DocumentError>;
    fn save(&mut self, draft: &OfflineDraft) -> Result<(), DocumentError>;
    fn clear(&mut self) -> Result<(), DocumentError>;
}

/// In-memory store. Holds the serialized form so it exercises the same
/// JSON path the browser store does.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    slot: Option<String>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self) -> Result<Option<OfflineDraft>, DocumentError> {
        let Some(raw) = &self.slot else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| DocumentError::Corrupt(e.to_string()))
    }

    fn save(&mut self, draft: &OfflineDraft) -> Result<(), DocumentError> {
        let raw = serde_json::to_string(draft).map_err(|e| DocumentError::Io(e.to_string()))?;
        self.slot = Some(raw);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DocumentError> {
        self.slot = None;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{DraftStore, OFFLINE_DRAFT_KEY, OfflineDraft};
    use crate::DocumentError;

    /// Browser localStorage-backed draft store.
    #[derive(Debug)]
    pub struct LocalStorageDraftStore {
        key: String,
    }

    impl LocalStorageDraftStore {
        pub fn new() -> Self {
            Self {
                key: OFFLINE_DRAFT_KEY.to_string(),
            }
        }

        pub fn with_key(key: impl Into<String>) -> Self {
            Self { key: key.into() }
        }
    }

    impl Default for LocalStorageDraftStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DraftStore for LocalStorageDraftStore {
        fn load(&self) -> Result<Option<OfflineDraft>, DocumentError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| DocumentError::Io(format!("get_item failed: {e:?}")))?;
            let Some(raw) = raw else {
                return Ok(None);
            };
            if raw.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DocumentError::Corrupt(e.to_string()))
        }

        fn save(&mut self, draft: &OfflineDraft) -> Result<(), DocumentError> {
            let storage = window_local_storage()?;
            let raw = serde_json::to_string(draft).map_err(|e| DocumentError::Io(e.to_string()))?;
            storage
                .set_item(&self.key, &raw)
                .map_err(|e| DocumentError::Io(format!("set_item failed: {e:?}")))
        }

        fn clear(&mut self) -> Result<(), DocumentError> {
            let storage = window_local_storage()?;
            storage
                .remove_item(&self.key)
                .map_err(|e| DocumentError::Io(format!("remove_item failed: {e:?}")))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, DocumentError> {
        let win = web_sys::window().ok_or(DocumentError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| DocumentError::Io(format!("localStorage error: {e:?}")))?
            .ok_or(DocumentError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageDraftStore;

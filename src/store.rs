//! Persisted client state: the token pair and locally read notice ids.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const READ_NOTICE_IDS_KEY: &str = "readedLocalNoticeIds";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key/value persistence the session and gateway read tokens from.
///
/// Getters return whatever is stored; expiry checks happen in the callers.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, or remove the key when `value` is `None`.
    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError>;

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn set_access_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.set(ACCESS_TOKEN_KEY, token)
    }

    fn set_refresh_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.set(REFRESH_TOKEN_KEY, token)
    }

    /// Ids of site notices the user dismissed locally. Unreadable values
    /// count as none.
    fn read_notice_ids(&self) -> Vec<i64> {
        self.get(READ_NOTICE_IDS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn set_read_notice_ids(&self, ids: &[i64]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(ids)?;
        self.set(READ_NOTICE_IDS_KEY, Some(&raw))
    }
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let mut values = self.values.write();
        match value {
            Some(v) => values.insert(key.to_string(), v.to_string()),
            None => values.remove(key),
        };
        Ok(())
    }
}

/// Store backed by a JSON object on disk. Every write rewrites the file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open the store at `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values: HashMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Opened token store at {} with {} keys", path.display(), values.len());

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn flush(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let mut values = self.values.write();
        match value {
            Some(v) => values.insert(key.to_string(), v.to_string()),
            None => values.remove(key),
        };
        self.flush(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("igame-store-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_set_and_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.access_token(), None);

        store.set_access_token(Some("a")).unwrap();
        store.set_refresh_token(Some("r")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a"));
        assert_eq!(store.refresh_token().as_deref(), Some("r"));

        store.set_access_token(None).unwrap();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token().as_deref(), Some("r"));
    }

    #[test]
    fn notice_ids() {
        let store = MemoryTokenStore::new();
        assert!(store.read_notice_ids().is_empty());
        store.set_read_notice_ids(&[3, 7]).unwrap();
        assert_eq!(store.read_notice_ids(), vec![3, 7]);

        store.set(READ_NOTICE_IDS_KEY, Some("{broken")).unwrap();
        assert!(store.read_notice_ids().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path();
        {
            let store = FileTokenStore::open(&path).unwrap();
            store.set_access_token(Some("access")).unwrap();
            store.set_refresh_token(Some("refresh")).unwrap();
            store.set_access_token(None).unwrap();
        }

        let reopened = FileTokenStore::open(&path).unwrap();
        assert_eq!(reopened.access_token(), None);
        assert_eq!(reopened.refresh_token().as_deref(), Some("refresh"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"refreshToken\""));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileTokenStore::open(&path), Err(StoreError::Corrupt(_))));
        fs::remove_file(&path).unwrap();
    }
}

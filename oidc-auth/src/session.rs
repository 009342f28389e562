//! Session store seam used by the authorization flow.
//!
//! The flow keeps nothing between calls; whatever must survive the redirect
//! round-trip lives in the caller's session behind this trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{session_error, Error, SessionErrorKind};

/// Key/value access to one browser session.
///
/// Implementations must isolate sessions from each other and make `remove`
/// an atomic read-then-delete, so a duplicated request cannot observe a value
/// another request already took.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value without removing it.
    async fn get<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send;

    /// Write a value, replacing any previous one.
    async fn insert<T>(&self, key: &str, value: T) -> Result<(), Error>
    where
        T: Serialize + Send;

    /// Remove a value, returning it if it was present.
    async fn remove<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send;
}

/// In-process session backed by a JSON map.
///
/// Cloning shares the underlying map, like a session handle.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn get<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let values = self.values.lock().await;
        values
            .get(key)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| session_error(SessionErrorKind::Load, e))
    }

    async fn insert<T>(&self, key: &str, value: T) -> Result<(), Error>
    where
        T: Serialize + Send,
    {
        let value =
            serde_json::to_value(value).map_err(|e| session_error(SessionErrorKind::Store, e))?;
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let removed = self.values.lock().await.remove(key);
        removed
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| session_error(SessionErrorKind::Load, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_insert_then_get() {
        let session = MemorySession::new();
        session.insert("greeting", "hello").await.unwrap();

        let value: Option<String> = session.get("greeting").await.unwrap();
        assert_eq!(value, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_remove_takes_value_once() {
        let session = MemorySession::new();
        session.insert("slot", 42u32).await.unwrap();

        let first: Option<u32> = session.remove("slot").await.unwrap();
        let second: Option<u32> = session.remove("slot").await.unwrap();
        assert_eq!(first, Some(42));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_clones_share_state_but_sessions_do_not() {
        let session = MemorySession::new();
        let handle = session.clone();
        let other = MemorySession::new();

        session.insert("slot", true).await.unwrap();

        assert_eq!(handle.get::<bool>("slot").await.unwrap(), Some(true));
        assert_eq!(other.get::<bool>("slot").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_load_error() {
        let session = MemorySession::new();
        session.insert("slot", "not a number").await.unwrap();

        let err = session.get::<u32>("slot").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Session(SessionErrorKind::Load));
    }
}

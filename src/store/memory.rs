// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! In-process KV Adapter test double.
//!
//! Interior `Mutex`-guarded state, no I/O, used to exercise the engine
//! without a live store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::{KvStore, Notification, NotificationStream};
use crate::error::RelayStateError;

#[derive(Default)]
struct Inner {
    /// Hash key -> field -> value.
    hashes: HashMap<String, HashMap<String, String>>,
    /// Insertion order of hash keys, so `keys_matching` returns a
    /// deterministic (if not semantically significant) order.
    key_order: Vec<String>,
    channels: HashMap<String, broadcast::Sender<Notification>>,
}

/// In-memory [`KvStore`] for unit and integration tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// A fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(inner: &mut Inner, name: &str) -> broadcast::Sender<Notification> {
        inner
            .channels
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .clone()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn hash_field_exists(&self, key: &str, field: &str) -> Result<bool, RelayStateError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get(key)
            .map(|h| h.contains_key(field))
            .unwrap_or(false))
    }

    async fn hash_field_get(&self, key: &str, field: &str) -> Result<String, RelayStateError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get(key)
            .and_then(|h| h.get(field))
            .cloned()
            .unwrap_or_default())
    }

    async fn hash_field_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RelayStateError> {
        let mut inner = self.inner.lock().await;
        if !inner.hashes.contains_key(key) {
            inner.key_order.push(key.to_string());
        }
        inner
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_field_delete(&self, key: &str, field: &str) -> Result<(), RelayStateError> {
        let mut inner = self.inner.lock().await;
        if let Some(h) = inner.hashes.get_mut(key) {
            h.remove(field);
        }
        Ok(())
    }

    async fn hash_field_list(&self, key: &str) -> Result<Vec<String>, RelayStateError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get(key)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn hash_multi_get(
        &self,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RelayStateError> {
        let inner = self.inner.lock().await;
        let hash = inner.hashes.get(key);
        Ok(fields
            .iter()
            .map(|f| hash.and_then(|h| h.get(*f)).cloned())
            .collect())
    }

    async fn hash_multi_set(
        &self,
        key: &str,
        values: &HashMap<&str, &str>,
    ) -> Result<(), RelayStateError> {
        let mut inner = self.inner.lock().await;
        if !inner.hashes.contains_key(key) {
            inner.key_order.push(key.to_string());
        }
        let h = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in values {
            h.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn key_exists(&self, key: &str) -> Result<bool, RelayStateError> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.contains_key(key))
    }

    async fn key_delete(&self, key: &str) -> Result<(), RelayStateError> {
        let mut inner = self.inner.lock().await;
        inner.hashes.remove(key);
        inner.key_order.retain(|k| k != key);
        Ok(())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, RelayStateError> {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        let inner = self.inner.lock().await;
        Ok(inner
            .key_order
            .iter()
            .filter(|k| k.starts_with(prefix) && inner.hashes.contains_key(k.as_str()))
            .cloned()
            .collect())
    }

    async fn publish(&self, channel: &str) -> Result<(), RelayStateError> {
        let mut inner = self.inner.lock().await;
        let tx = Self::channel(&mut inner, channel);
        // No subscribers is not an error: the channel has no delivery
        // guarantee beyond "every subscribed process".
        let _ = tx.send(Notification);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<NotificationStream, RelayStateError> {
        let mut inner = self.inner.lock().await;
        let tx = Self::channel(&mut inner, channel);
        let rx = tx.subscribe();
        let stream = BroadcastStream::new(rx).filter_map(|item| item.ok());
        Ok(Box::pin(stream))
    }
}

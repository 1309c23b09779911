// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! KV Adapter: typed operations over the remote key-value store

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

use crate::error::RelayStateError;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::{RedisStore, RelayStoreConfig};

/// A single invalidation message. The payload carries no information;
/// consumers derive no information from the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification;

/// Stream of invalidation messages returned by [`KvStore::subscribe`].
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Thin typed operations over the remote hash/pub-sub store backing the
/// relay's durable state.
///
/// Each primitive is a single remote operation and either succeeds or
/// fails with [`RelayStateError::Transport`], propagated unchanged.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Does `field` exist within hash `key`?
    async fn hash_field_exists(&self, key: &str, field: &str) -> Result<bool, RelayStateError>;

    /// Read `field` from hash `key`. Undefined if absent; callers check
    /// [`Self::hash_field_exists`] first.
    async fn hash_field_get(&self, key: &str, field: &str) -> Result<String, RelayStateError>;

    /// Create or overwrite `field` in hash `key`.
    async fn hash_field_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RelayStateError>;

    /// Delete `field` from hash `key`.
    async fn hash_field_delete(&self, key: &str, field: &str) -> Result<(), RelayStateError>;

    /// All field names of hash `key`, in unspecified order.
    async fn hash_field_list(&self, key: &str) -> Result<Vec<String>, RelayStateError>;

    /// Positional multi-get: fields absent in the hash yield `None` at
    /// their position.
    async fn hash_multi_get(
        &self,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RelayStateError>;

    /// Atomically set every field in `values` within hash `key`.
    async fn hash_multi_set(
        &self,
        key: &str,
        values: &HashMap<&str, &str>,
    ) -> Result<(), RelayStateError>;

    /// Does `key` exist?
    async fn key_exists(&self, key: &str) -> Result<bool, RelayStateError>;

    /// Delete `key` entirely.
    async fn key_delete(&self, key: &str) -> Result<(), RelayStateError>;

    /// All keys matching `pattern` (used once, with
    /// `relay:subscription:*`). Must return every matching key.
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, RelayStateError>;

    /// Publish an (empty) payload on `channel`.
    async fn publish(&self, channel: &str) -> Result<(), RelayStateError>;

    /// Subscribe to `channel`, returning an infinite stream of messages.
    async fn subscribe(&self, channel: &str) -> Result<NotificationStream, RelayStateError>;
}

// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Production KV Adapter backed by a Redis-compatible store.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use super::{KvStore, Notification, NotificationStream};
use crate::error::RelayStateError;

/// Connection parameters for [`RedisStore`].
///
/// This crate never reads these from the environment or a config file
/// itself: construction is the caller's (CLI/config loader's)
/// responsibility, parsing config files being an explicit Non-goal.
#[derive(Debug, Clone)]
pub struct RelayStoreConfig {
    url: String,
}

impl RelayStoreConfig {
    /// Build from host/port/optional password/TLS.
    pub fn new(host: &str, port: u16, password: Option<&str>, tls: bool) -> Self {
        let scheme = if tls { "rediss" } else { "redis" };
        let url = match password {
            Some(pass) => format!("{scheme}://:{pass}@{host}:{port}"),
            None => format!("{scheme}://{host}:{port}"),
        };
        Self { url }
    }

    /// Build directly from a `redis://` (or `rediss://`) URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Redis-backed [`KvStore`].
///
/// Commands run over an async [`ConnectionManager`] (auto-reconnecting,
/// cheaply cloned); [`KvStore::subscribe`] opens its own dedicated
/// pub/sub connection per call, matching Redis's requirement that a
/// connection in subscriber mode cannot also run commands.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store described by `config`.
    pub async fn connect(config: &RelayStoreConfig) -> Result<Self, RelayStateError> {
        let client = Client::open(config.url.clone())?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { client, conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn hash_field_exists(&self, key: &str, field: &str) -> Result<bool, RelayStateError> {
        let mut conn = self.conn.clone();
        Ok(conn.hexists(key, field).await?)
    }

    async fn hash_field_get(&self, key: &str, field: &str) -> Result<String, RelayStateError> {
        let mut conn = self.conn.clone();
        Ok(conn.hget(key, field).await?)
    }

    async fn hash_field_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RelayStateError> {
        let mut conn = self.conn.clone();
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }

    async fn hash_field_delete(&self, key: &str, field: &str) -> Result<(), RelayStateError> {
        let mut conn = self.conn.clone();
        let _: () = conn.hdel(key, field).await?;
        Ok(())
    }

    async fn hash_field_list(&self, key: &str) -> Result<Vec<String>, RelayStateError> {
        let mut conn = self.conn.clone();
        Ok(conn.hkeys(key).await?)
    }

    async fn hash_multi_get(
        &self,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RelayStateError> {
        let mut conn = self.conn.clone();
        Ok(conn.hget(key, fields.to_vec()).await?)
    }

    async fn hash_multi_set(
        &self,
        key: &str,
        values: &HashMap<&str, &str>,
    ) -> Result<(), RelayStateError> {
        let mut conn = self.conn.clone();
        let items: Vec<(&str, &str)> = values.iter().map(|(f, v)| (*f, *v)).collect();
        let _: () = conn.hset_multiple(key, &items).await?;
        Ok(())
    }

    async fn key_exists(&self, key: &str) -> Result<bool, RelayStateError> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn key_delete(&self, key: &str) -> Result<(), RelayStateError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, RelayStateError> {
        let mut conn = self.conn.clone();
        let mut iter: redis::AsyncIter<'_, String> = conn.scan_match(pattern).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }

    async fn publish(&self, channel: &str) -> Result<(), RelayStateError> {
        let mut conn = self.conn.clone();
        let _: () = conn.publish(channel, "").await?;
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<NotificationStream, RelayStateError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while stream.next().await.is_some() {
                if tx.send(Notification).await.is_err() {
                    break;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

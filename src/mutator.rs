// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Mutator: typed write operations that update the store, then announce
//! on the invalidation channel.

use std::collections::HashMap;

use crate::domain::{DomainKind, DOMAIN_FIELD_VALUE};
use crate::error::RelayStateError;
use crate::options::{encode_flag, OptionKind};
use crate::state::RelayStateHandle;
use crate::subscription::{encode_available, subscription_key, Subscription, SubscriptionFilter};

const CONFIG_KEY: &str = "relay:config";
const REFRESH_CHANNEL: &str = "relay_refresh";

impl RelayStateHandle {
    /// Set one policy flag.
    ///
    /// Writes `relay:config` then publishes on `relay_refresh`. The
    /// publish is only attempted once the write has succeeded.
    #[tracing::instrument(skip(self))]
    pub async fn set_option(&self, kind: OptionKind, value: bool) -> Result<(), RelayStateError> {
        self.store
            .hash_field_set(CONFIG_KEY, kind.field_name(), encode_flag(value))
            .await?;
        self.announce().await
    }

    /// Add `domain` to the `Limited` or `Blocked` set.
    #[tracing::instrument(skip(self))]
    pub async fn set_domain(&self, kind: DomainKind, domain: &str) -> Result<(), RelayStateError> {
        self.store
            .hash_field_set(kind.store_key(), domain, DOMAIN_FIELD_VALUE)
            .await?;
        self.announce().await
    }

    /// Remove `domain` from the `Limited` or `Blocked` set.
    ///
    /// Fails with [`RelayStateError::NotFound`] if the field does not
    /// exist; no store mutation occurs in that case.
    #[tracing::instrument(skip(self))]
    pub async fn delete_domain(
        &self,
        kind: DomainKind,
        domain: &str,
    ) -> Result<(), RelayStateError> {
        if !self.store.hash_field_exists(kind.store_key(), domain).await? {
            return Err(RelayStateError::not_found(format!(
                "{}:{domain}",
                kind.store_key()
            )));
        }
        self.store.hash_field_delete(kind.store_key(), domain).await?;
        self.announce().await
    }

    /// Create or overwrite a subscription row.
    #[tracing::instrument(skip(self, subscription))]
    pub async fn set_subscription(&self, subscription: Subscription) -> Result<(), RelayStateError> {
        let key = subscription.store_key();
        let available = encode_available(subscription.available);
        let values: HashMap<&str, &str> = HashMap::from([
            ("inbox_url", subscription.inbox_url.as_str()),
            ("activity_id", subscription.activity_id.as_str()),
            ("actor_id", subscription.actor_id.as_str()),
            ("available", available),
        ]);
        self.store.hash_multi_set(&key, &values).await?;
        self.announce().await
    }

    /// Delete a subscription entirely.
    ///
    /// Fails with [`RelayStateError::NotFound`] if the key does not
    /// exist; no store mutation occurs in that case.
    #[tracing::instrument(skip(self))]
    pub async fn delete_subscription(&self, domain: &str) -> Result<(), RelayStateError> {
        let key = subscription_key(domain);
        if !self.store.key_exists(&key).await? {
            return Err(RelayStateError::not_found(key));
        }
        self.store.key_delete(&key).await?;
        self.announce().await
    }

    /// Transition a pending subscription to active.
    ///
    /// Scans the *current projection's* pending subscriptions for
    /// `domain`. Fails with [`RelayStateError::NotFound`] if no pending
    /// entry matches; an already-active subscription does not satisfy
    /// the precondition.
    #[tracing::instrument(skip(self))]
    pub async fn promote_subscription(&self, domain: &str) -> Result<(), RelayStateError> {
        let pending = self.get_subscriptions(SubscriptionFilter::Pending).await;
        let subscription = pending
            .into_iter()
            .find(|s| s.domain == domain)
            .ok_or_else(|| RelayStateError::not_found(subscription_key(domain)))?;
        self.set_subscription(subscription.promoted()).await
    }

    /// Publish an invalidation signal. Only reached after a successful
    /// write; the write is durable whether or not this succeeds.
    async fn announce(&self) -> Result<(), RelayStateError> {
        if let Err(e) = self.store.publish(REFRESH_CHANNEL).await {
            tracing::error!("relay_refresh: publish failed after durable write: {e}");
            return Err(e);
        }
        Ok(())
    }
}

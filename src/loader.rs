// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Loader: builds a fresh [`RelayState`] projection from a [`KvStore`].

use std::sync::Arc;

use crate::domain::DomainKind;
use crate::error::RelayStateError;
use crate::options::{decode_flag, encode_flag, OptionKind, RelayOptions};
use crate::state::{RelayState, RelayStateHandle};
use crate::store::KvStore;
use crate::subscription::{decode_available, Subscription, SUBSCRIPTION_KEY_PREFIX};

const CONFIG_KEY: &str = "relay:config";
const SUBSCRIPTION_PATTERN: &str = "relay:subscription:*";

impl RelayStateHandle {
    /// Connect to `store` and perform the initial load.
    ///
    /// Fails iff the load fails; there is no previous projection to fall
    /// back to on the very first construction.
    pub async fn connect(store: Arc<dyn KvStore>) -> Result<Self, RelayStateError> {
        let state = load(store.as_ref()).await?;
        Ok(Self::from_parts(store, state))
    }
}

/// Build a complete fresh [`RelayState`] by reading every backing key.
///
/// Any transport error aborts the load and surfaces unchanged; the
/// previous projection, if any, is left untouched by the caller.
#[tracing::instrument(skip(store))]
pub(crate) async fn load(store: &dyn KvStore) -> Result<RelayState, RelayStateError> {
    let options = load_options(store).await?;
    let limited = store.hash_field_list(DomainKind::Limited.store_key()).await?;
    let blocked = store.hash_field_list(DomainKind::Blocked.store_key()).await?;
    let subscriptions = load_subscriptions(store).await?;

    tracing::debug!(
        limited = limited.len(),
        blocked = blocked.len(),
        subscriptions = subscriptions.len(),
        "relay state loaded",
    );

    Ok(RelayState {
        options,
        limited,
        blocked,
        subscriptions,
    })
}

/// Read each option field, provisioning `"0"` into the store when a field
/// is missing. After a first load on an empty store, all three option
/// fields exist with value `"0"`.
async fn load_options(store: &dyn KvStore) -> Result<RelayOptions, RelayStateError> {
    let mut options = RelayOptions::default();

    for kind in OptionKind::ALL {
        let field = kind.field_name();
        let raw = if store.hash_field_exists(CONFIG_KEY, field).await? {
            store.hash_field_get(CONFIG_KEY, field).await?
        } else {
            tracing::debug!(field, "provisioning missing relay:config field");
            store.hash_field_set(CONFIG_KEY, field, encode_flag(false)).await?;
            encode_flag(false).to_string()
        };
        options = options.with(kind, decode_flag(&raw));
    }

    Ok(options)
}

/// Enumerate every `relay:subscription:*` key and build a [`Subscription`]
/// for each, preserving the enumeration order the store returns.
async fn load_subscriptions(store: &dyn KvStore) -> Result<Vec<Subscription>, RelayStateError> {
    let keys = store.keys_matching(SUBSCRIPTION_PATTERN).await?;
    let mut subscriptions = Vec::with_capacity(keys.len());

    for key in keys {
        let Some(domain) = key.strip_prefix(SUBSCRIPTION_KEY_PREFIX) else {
            continue;
        };
        let fields = store
            .hash_multi_get(&key, &["inbox_url", "activity_id", "actor_id", "available"])
            .await?;
        let [inbox_url, activity_id, actor_id, available] = fields.as_slice() else {
            continue;
        };

        // A row with no `inbox_url` is not a valid subscription; skip it
        // silently.
        let Some(inbox_url) = inbox_url else {
            continue;
        };

        subscriptions.push(Subscription {
            domain: domain.to_string(),
            inbox_url: inbox_url.clone(),
            activity_id: activity_id.clone().unwrap_or_default(),
            actor_id: actor_id.clone().unwrap_or_default(),
            available: decode_available(available.as_deref()),
        });
    }

    Ok(subscriptions)
}

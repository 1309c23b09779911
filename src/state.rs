// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! The relay state projection and the handle processes use to read it.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::DomainKind;
use crate::options::{OptionKind, RelayOptions};
use crate::store::KvStore;
use crate::subscription::{Subscription, SubscriptionFilter};

/// Immutable in-memory snapshot of relay policy and subscriptions.
///
/// Never mutated in place: mutators write the store and rely on the
/// invalidation listener to install a fresh projection. Readers take a
/// short-lived [`Arc`] clone and never tear across a concurrent swap.
#[derive(Debug, Clone, Default)]
pub struct RelayState {
    pub(crate) options: RelayOptions,
    pub(crate) limited: Vec<String>,
    pub(crate) blocked: Vec<String>,
    pub(crate) subscriptions: Vec<Subscription>,
}

impl RelayState {
    pub(crate) fn domain_set(&self, kind: DomainKind) -> &[String] {
        match kind {
            DomainKind::Limited => &self.limited,
            DomainKind::Blocked => &self.blocked,
        }
    }
}

/// Handle shared by the API server, job workers, and CLI: the engine's
/// entry point for reading and mutating relay state.
///
/// The current projection is the sole shared-mutable resource in the
/// engine: an `RwLock<Arc<RelayState>>` swapped wholesale by the
/// invalidation listener, never touched directly by mutators.
#[derive(Clone)]
pub struct RelayStateHandle {
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) projection: Arc<RwLock<Arc<RelayState>>>,
}

impl RelayStateHandle {
    pub(crate) fn from_parts(store: Arc<dyn KvStore>, state: RelayState) -> Self {
        Self {
            store,
            projection: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    /// Take a short-lived reference to the current snapshot.
    async fn snapshot(&self) -> Arc<RelayState> {
        self.projection.read().await.clone()
    }

    pub(crate) async fn install(&self, state: RelayState) {
        let mut guard = self.projection.write().await;
        *guard = Arc::new(state);
    }

    /// Read one policy flag from the current snapshot.
    pub async fn get_option(&self, kind: OptionKind) -> bool {
        self.snapshot().await.options.get(kind)
    }

    /// Read one domain set from the current snapshot.
    pub async fn get_domain_set(&self, kind: DomainKind) -> Vec<String> {
        self.snapshot().await.domain_set(kind).to_vec()
    }

    /// Read the subscriptions matching `filter`, preserving the
    /// projection's internal order.
    pub async fn get_subscriptions(&self, filter: SubscriptionFilter) -> Vec<Subscription> {
        let snapshot = self.snapshot().await;
        filter
            .apply(&snapshot.subscriptions)
            .into_iter()
            .cloned()
            .collect()
    }
}

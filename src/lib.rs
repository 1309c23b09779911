// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Relay state engine
//!
//! The durable, shared configuration and subscription registry that
//! backs an ActivityPub relay's running processes (API server, job
//! workers, CLI), kept consistent across them through an out-of-process
//! key-value store with pub/sub invalidation.
//!
//! This crate implements only the engine: the data model for relay
//! policy, a read-through in-memory projection over the store, the
//! invalidation channel that keeps multiple process instances eventually
//! consistent, and the typed operations by which callers mutate state.
//! HTTP routing, ActivityPub document assembly, signature generation,
//! outbound delivery, CLI parsing and config-file loading are external
//! collaborators, not part of this crate.

#![warn(missing_docs)]

mod domain;
mod error;
mod listener;
mod loader;
mod mutator;
mod options;
mod state;
mod store;
mod subscription;

pub use self::domain::DomainKind;
pub use self::error::RelayStateError;
pub use self::listener::ListenerHandle;
pub use self::options::{OptionKind, RelayOptions};
pub use self::state::{RelayState, RelayStateHandle};
pub use self::store::{KvStore, MemoryStore, NotificationStream, RedisStore, RelayStoreConfig};
pub use self::subscription::{Subscription, SubscriptionFilter};

// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Relay state engine error

use thiserror::Error;

/// Errors surfaced by the relay state engine.
#[derive(Debug, Error)]
pub enum RelayStateError {
    /// A KV adapter operation failed.
    #[error("store transport error: {0}")]
    Transport(#[from] redis::RedisError),
    /// An option, domain, or subscription discriminator was outside its
    /// enumerated set.
    #[error("invalid kind: {0}")]
    InvalidKind(i64),
    /// A mutator precondition was violated: the targeted row does not
    /// exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl RelayStateError {
    /// Build a [`RelayStateError::NotFound`] naming the missing key/field.
    #[inline]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Limited / blocked domain sets

use crate::error::RelayStateError;

/// Which of the two domain hashes an operation targets.
///
/// A domain may belong to `Limited` and `Blocked` independently; the two
/// sets are not mutually exclusive at the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// Reduced-trust federation partners.
    Limited,
    /// Fully denied federation partners.
    Blocked,
}

impl DomainKind {
    /// The store key backing this domain set.
    pub fn store_key(&self) -> &'static str {
        match self {
            DomainKind::Limited => "relay:config:limitedDomain",
            DomainKind::Blocked => "relay:config:blockedDomain",
        }
    }

    /// Decode from the source's integer discriminator.
    pub fn from_i64(value: i64) -> Result<Self, RelayStateError> {
        match value {
            0 => Ok(DomainKind::Limited),
            1 => Ok(DomainKind::Blocked),
            other => Err(RelayStateError::InvalidKind(other)),
        }
    }
}

/// The conventional, semantically-ignored value stored for each domain
/// field.
pub const DOMAIN_FIELD_VALUE: &str = "1";

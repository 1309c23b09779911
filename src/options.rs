// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Relay policy options

use crate::error::RelayStateError;

/// The three independent boolean policy flags governing the relay's
/// behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayOptions {
    /// Whether actors of type "Service" are refused as subscribers.
    pub block_service: bool,
    /// Whether follow requests become pending instead of auto-accepted.
    pub manually_accept: bool,
    /// Whether incoming "Create" activities are rebroadcast as "Announce".
    pub create_as_announce: bool,
}

impl RelayOptions {
    /// Read the flag named by `kind`.
    #[inline]
    pub fn get(&self, kind: OptionKind) -> bool {
        match kind {
            OptionKind::BlockService => self.block_service,
            OptionKind::ManuallyAccept => self.manually_accept,
            OptionKind::CreateAsAnnounce => self.create_as_announce,
        }
    }

    /// Return a copy with the flag named by `kind` set to `value`.
    #[inline]
    pub fn with(mut self, kind: OptionKind, value: bool) -> Self {
        match kind {
            OptionKind::BlockService => self.block_service = value,
            OptionKind::ManuallyAccept => self.manually_accept = value,
            OptionKind::CreateAsAnnounce => self.create_as_announce = value,
        }
        self
    }
}

/// Closed set of relay option discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// [`RelayOptions::block_service`]
    BlockService,
    /// [`RelayOptions::manually_accept`]
    ManuallyAccept,
    /// [`RelayOptions::create_as_announce`]
    CreateAsAnnounce,
}

impl OptionKind {
    /// The `relay:config` hash field name for this kind.
    pub fn field_name(&self) -> &'static str {
        match self {
            OptionKind::BlockService => "block_service",
            OptionKind::ManuallyAccept => "manually_accept",
            OptionKind::CreateAsAnnounce => "create_as_announce",
        }
    }

    /// All kinds, in the order the loader provisions them.
    pub const ALL: [OptionKind; 3] = [
        OptionKind::BlockService,
        OptionKind::ManuallyAccept,
        OptionKind::CreateAsAnnounce,
    ];

    /// Decode from the source's integer discriminator.
    ///
    /// Callers embedding this engine in a CLI or API that still speaks in
    /// small integer kinds (as the original Go source does) can use this
    /// to map onto the closed enum; anything outside `0..=2` is
    /// [`RelayStateError::InvalidKind`].
    pub fn from_i64(value: i64) -> Result<Self, RelayStateError> {
        match value {
            0 => Ok(OptionKind::BlockService),
            1 => Ok(OptionKind::ManuallyAccept),
            2 => Ok(OptionKind::CreateAsAnnounce),
            other => Err(RelayStateError::InvalidKind(other)),
        }
    }
}

/// Encode a boolean option value the way `relay:config` stores it.
#[inline]
pub fn encode_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Decode a `relay:config` field value into a boolean.
///
/// Equality with the literal `"1"` is the only truthy form; anything else
/// (including absence, handled by the caller before this is reached)
/// decodes to `false`.
#[inline]
pub fn decode_flag(value: &str) -> bool {
    value == "1"
}

// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Subscriber registry rows

/// One registered subscriber instance, keyed externally by `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Subscriber hostname; the store key suffix of
    /// `relay:subscription:<domain>`.
    pub domain: String,
    /// URL to deliver activities to.
    pub inbox_url: String,
    /// ID of the original Follow activity. May be empty for historical
    /// rows that predate this field.
    pub activity_id: String,
    /// ID of the subscribing actor. May be empty for historical rows.
    pub actor_id: String,
    /// `true` = active subscription, `false` = pending acceptance.
    pub available: bool,
}

impl Subscription {
    /// The store key for this subscription.
    pub fn store_key(&self) -> String {
        subscription_key(&self.domain)
    }

    /// Return a copy promoted to active.
    pub fn promoted(&self) -> Self {
        Self {
            available: true,
            ..self.clone()
        }
    }
}

/// The store key for a given subscriber domain.
#[inline]
pub fn subscription_key(domain: &str) -> String {
    format!("relay:subscription:{domain}")
}

/// Prefix stripped from scanned `relay:subscription:*` keys to recover the
/// domain.
pub const SUBSCRIPTION_KEY_PREFIX: &str = "relay:subscription:";

/// Serialize [`Subscription::available`] the way the store encodes it:
/// the literal strings `"true"` / `"false"`.
#[inline]
pub fn encode_available(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Decode a stored `available` field.
///
/// Any value other than the literal `"true"` decodes to `false`; absence
/// of the field (represented here by `None`, since legacy rows predate
/// it) decodes to `true`.
#[inline]
pub fn decode_available(value: Option<&str>) -> bool {
    match value {
        Some(v) => v == "true",
        None => true,
    }
}

/// Filter applied to [`crate::state::RelayState::subscriptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionFilter {
    /// Active subscriptions (`available = true`).
    Subscribe,
    /// Pending subscriptions (`available = false`).
    Pending,
}

impl SubscriptionFilter {
    #[inline]
    fn matches(&self, available: bool) -> bool {
        match self {
            SubscriptionFilter::Subscribe => available,
            SubscriptionFilter::Pending => !available,
        }
    }

    /// Filter a slice of subscriptions, preserving order.
    pub fn apply<'a>(&self, subs: &'a [Subscription]) -> Vec<&'a Subscription> {
        subs.iter().filter(|s| self.matches(s.available)).collect()
    }
}

//! Link identity and provenance types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized identity of a URL.
///
/// Two URLs that differ only in scheme, `www.` prefix, a root trailing
/// slash, or tracking query parameters share the same canonical key. The
/// key doubles as the storage key for the link's provenance record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Creates a canonical key from an already-normalized string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CanonicalKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CanonicalKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The stored fact of who shared a canonical link, and where.
///
/// At most one record exists per canonical key at any time; the record
/// expires from the underlying store after the configured retention window.
/// Losing a record only means a future reshare is not recognized as a
/// repeat, so this is soft state, not a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProvenance {
    /// Normalized identity of the link; acts as the store key.
    pub canonical_key: CanonicalKey,
    /// The raw token as it appeared in the message, for display.
    pub original_url: String,
    /// Channel in which the link was recorded.
    pub channel_id: String,
    /// Message that carried the link.
    pub message_id: String,
    /// User who shared the link.
    pub user_id: String,
    /// Parent thread identifier, if the sharing message was inside a thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// When this record was written.
    pub observed_at: DateTime<Utc>,
}

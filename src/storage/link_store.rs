//! Link-specific semantics over the key-value collaborator.
//!
//! Every operation takes the raw URL and derives the canonical key
//! internally, so callers never hand-build store keys. Records are
//! serialized as JSON and written with the retention TTL.

use crate::models::{CanonicalKey, LinkProvenance};
use crate::services::canonical::normalize;
use crate::storage::KeyValueBackend;
use crate::{Error, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Store of link provenance records, keyed by canonical link identity.
pub struct LinkStore<S> {
    backend: S,
    ttl: Duration,
}

impl<S: KeyValueBackend> LinkStore<S> {
    /// Creates a store writing entries with the given retention TTL.
    #[must_use]
    pub const fn new(backend: S, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Looks up the provenance record for a raw URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend read fails. A record that exists
    /// but no longer deserializes is treated as absent (and will be
    /// overwritten by the next put), not as an error.
    pub async fn lookup(&self, raw_url: &str) -> Result<Option<LinkProvenance>> {
        self.read(&normalize(raw_url)).await
    }

    /// Writes a provenance record for a raw URL.
    ///
    /// With `preserve_original`, an existing record wins and the write is a
    /// no-op: the first sharer within the retention window stays on record.
    /// Without it, the record is overwritten unconditionally. Either way
    /// the write carries the store TTL.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the backend write fails.
    pub async fn put(
        &self,
        raw_url: &str,
        provenance: &LinkProvenance,
        preserve_original: bool,
    ) -> Result<()> {
        let key = normalize(raw_url);

        if preserve_original && self.read(&key).await?.is_some() {
            debug!(key = %key, "record exists, preserving original provenance");
            return Ok(());
        }

        let value = serde_json::to_string(provenance).map_err(|e| Error::OperationFailed {
            operation: "serialize_provenance".to_string(),
            cause: e.to_string(),
        })?;
        self.backend.set(key.as_str(), &value, Some(self.ttl)).await
    }

    /// Deletes the record for a raw URL, but only when it still points at
    /// the given message in the given channel.
    ///
    /// Returns whether a delete occurred. The match guard keeps a deletion
    /// of message A from erasing provenance that message B re-established
    /// for the same canonical link.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend read or delete fails.
    pub async fn remove_if_matches(
        &self,
        raw_url: &str,
        message_id: &str,
        channel_id: &str,
    ) -> Result<bool> {
        let key = normalize(raw_url);

        let Some(existing) = self.read(&key).await? else {
            return Ok(false);
        };
        if existing.message_id != message_id || existing.channel_id != channel_id {
            debug!(key = %key, "record points at a different message, keeping");
            return Ok(false);
        }

        self.backend.delete(key.as_str()).await?;
        debug!(key = %key, "removed provenance record");
        Ok(true)
    }

    async fn read(&self, key: &CanonicalKey) -> Result<Option<LinkProvenance>> {
        let Some(value) = self.backend.get(key.as_str()).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&value) {
            Ok(provenance) => Ok(Some(provenance)),
            Err(error) => {
                warn!(key = %key, %error, "discarding unreadable provenance record");
                Ok(None)
            }
        }
    }
}

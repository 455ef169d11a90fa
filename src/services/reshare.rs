//! Resharing engine.
//!
//! The orchestrator: extracts links from an incoming message, looks each
//! one up in the link store, walks the notification decision ladder, and
//! persists fresh provenance. Also handles the inverse path, cleaning up
//! provenance when the originating message is deleted.

use crate::config::RelinkConfig;
use crate::models::{
    CanonicalKey, DeletionEvent, LinkProvenance, MessageEvent, ProcessingResult,
};
use crate::services::canonical::normalize;
use crate::services::clock::{Clock, SystemClock};
use crate::services::extract::LinkExtractor;
use crate::storage::{KeyValueBackend, LinkStore};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Orchestrates link re-share detection for one chat workspace.
///
/// Generic over the storage collaborator and the time source; the defaults
/// are the host-provided backend and the wall clock.
pub struct ResharingEngine<S: KeyValueBackend, C: Clock = SystemClock> {
    extractor: LinkExtractor,
    store: LinkStore<S>,
    allowlist: Vec<String>,
    recency_window: chrono::Duration,
    clock: C,
}

impl<S: KeyValueBackend> ResharingEngine<S, SystemClock> {
    /// Creates an engine reading the wall clock.
    #[must_use]
    pub fn new(backend: S, config: &RelinkConfig) -> Self {
        Self::with_clock(backend, config, SystemClock)
    }
}

impl<S: KeyValueBackend, C: Clock> ResharingEngine<S, C> {
    /// Creates an engine with an explicit time source.
    #[must_use]
    pub fn with_clock(backend: S, config: &RelinkConfig, clock: C) -> Self {
        // An out-of-range window would suppress every notification; the
        // config defaults keep this in the milliseconds-to-seconds range.
        let recency_window = chrono::Duration::from_std(config.recency_window)
            .unwrap_or_else(|_| chrono::Duration::MAX);

        Self {
            extractor: LinkExtractor::new(),
            store: LinkStore::new(backend, config.link_ttl),
            allowlist: config.allowlist.clone(),
            recency_window,
            clock,
        }
    }

    /// Processes one inbound message.
    ///
    /// Never fails: store read errors degrade to "link not seen before" and
    /// store write errors are logged per link, so a storage outage costs
    /// only missed re-share notifications, never message processing.
    #[instrument(
        skip(self, message),
        fields(message_id = %message.id, channel_id = %message.channel_id)
    )]
    pub async fn process_message(&self, message: &MessageEvent) -> ProcessingResult {
        let links = self.extractor.extract(&message.text);
        if links.is_empty() {
            return ProcessingResult::empty();
        }

        let keys: Vec<CanonicalKey> = links.iter().map(|raw| normalize(raw)).collect();

        // All lookups go out together; decisions wait for the whole batch.
        let lookups = join_all(links.iter().map(|raw| self.lookup_fail_open(raw))).await;

        let now = self.clock.now();
        let mut seen_notices: HashSet<String> = HashSet::new();
        let mut notices: Vec<String> = Vec::new();
        for (key, existing) in keys.iter().zip(&lookups) {
            if let Some(notice) = self.decide(message, key, existing.as_ref(), now) {
                if seen_notices.insert(notice.clone()) {
                    notices.push(notice);
                }
            }
        }

        // Every extracted link gets fresh provenance, whatever the ladder
        // said; preserve-original keeps the first sharer on record.
        join_all(
            links
                .iter()
                .zip(&keys)
                .map(|(raw, key)| self.persist(message, raw, key, now)),
        )
        .await;

        metrics::counter!("relink_reshare_notices_total").increment(notices.len() as u64);
        debug!(
            links = links.len(),
            notices = notices.len(),
            "processed message"
        );

        let response = if notices.is_empty() {
            None
        } else {
            Some(notices.join("\n"))
        };
        ProcessingResult {
            links_found: links,
            response,
        }
    }

    /// Processes a message-deletion event.
    ///
    /// Removes provenance records that still point at the deleted message;
    /// records re-shared from a different message are left intact.
    #[instrument(
        skip(self, event),
        fields(message_id = %event.deleted_message_id, channel_id = %event.channel_id)
    )]
    pub async fn process_deletion(&self, event: &DeletionEvent) {
        let Some(previous_text) = event.previous_text.as_deref() else {
            debug!("deletion without previous text, nothing to clean up");
            return;
        };

        let links = self.extractor.extract(previous_text);
        if links.is_empty() {
            return;
        }

        let removed: usize = join_all(links.iter().map(|raw| async move {
            match self
                .store
                .remove_if_matches(raw, &event.deleted_message_id, &event.channel_id)
                .await
            {
                Ok(true) => 1,
                Ok(false) => 0,
                Err(error) => {
                    warn!(url = %raw, %error, "provenance cleanup failed");
                    0
                }
            }
        }))
        .await
        .into_iter()
        .sum();

        metrics::counter!("relink_provenance_removed_total").increment(removed as u64);
        debug!(removed, links = links.len(), "processed message deletion");
    }

    /// Looks up one link, treating store errors as "no record found".
    async fn lookup_fail_open(&self, raw: &str) -> Option<LinkProvenance> {
        match self.store.lookup(raw).await {
            Ok(existing) => existing,
            Err(error) => {
                warn!(url = %raw, %error, "link lookup failed, treating as unseen");
                metrics::counter!("relink_store_errors_total").increment(1);
                None
            }
        }
    }

    /// Persists fresh provenance for one link, isolating failures.
    async fn persist(
        &self,
        message: &MessageEvent,
        raw: &str,
        key: &CanonicalKey,
        now: DateTime<Utc>,
    ) {
        let provenance = LinkProvenance {
            canonical_key: key.clone(),
            original_url: raw.to_string(),
            channel_id: message.channel_id.clone(),
            message_id: message.id.clone(),
            user_id: message.user_id.clone(),
            thread_id: message.thread_id.clone(),
            observed_at: now,
        };

        if let Err(error) = self.store.put(raw, &provenance, true).await {
            warn!(url = %raw, %error, "link persist failed");
            metrics::counter!("relink_store_errors_total").increment(1);
        }
    }

    /// The notification decision ladder; first matching rule wins.
    fn decide(
        &self,
        message: &MessageEvent,
        key: &CanonicalKey,
        existing: Option<&LinkProvenance>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        // (a) Allow-listed links are expected to recur.
        if self
            .allowlist
            .iter()
            .any(|prefix| key.as_str().starts_with(prefix.as_str()))
        {
            debug!(key = %key, "link is allow-listed");
            return None;
        }

        // (b) First time seen.
        let existing = existing?;

        // (c) A record this fresh is the message currently being processed,
        // or a duplicate event delivery, not a genuine reshare. This also
        // outranks any self-reshare distinction: past the window, the
        // original sharer is notified like anyone else.
        let age = now.signed_duration_since(existing.observed_at);
        if age < self.recency_window {
            debug!(key = %key, age_ms = age.num_milliseconds(), "record too fresh, suppressing");
            return None;
        }

        // (d) Cross-channel reshare.
        if existing.channel_id != message.channel_id {
            return Some(format!(
                "<{}> was already shared in <#{}>",
                existing.original_url, existing.channel_id
            ));
        }

        // (e) Same thread as the original share.
        if message.thread_id.is_some() && message.thread_id == existing.thread_id {
            return Some(format!(
                "<{}> was already shared in this thread by <@{}>",
                existing.original_url, existing.user_id
            ));
        }

        // (f) Same channel, different thread or top-level.
        Some(format!(
            "<{}> was already shared in this channel by <@{}>",
            existing.original_url, existing.user_id
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::services::clock::ManualClock;
    use crate::storage::InMemoryBackend;
    use std::time::Duration;

    fn message(text: &str, id: &str, channel: &str, user: &str) -> MessageEvent {
        MessageEvent {
            text: text.to_string(),
            id: id.to_string(),
            channel_id: channel.to_string(),
            user_id: user.to_string(),
            thread_id: None,
        }
    }

    fn engine_with_clock(
        config: &RelinkConfig,
    ) -> (ResharingEngine<InMemoryBackend, ManualClock>, ManualClock) {
        let clock = ManualClock::epoch();
        clock.advance(Duration::from_secs(1_700_000_000));
        let engine =
            ResharingEngine::with_clock(InMemoryBackend::with_defaults(), config, clock.clone());
        (engine, clock)
    }

    #[tokio::test]
    async fn test_message_without_links_is_a_no_op() {
        let (engine, _clock) = engine_with_clock(&RelinkConfig::default());
        let result = engine.process_message(&message("hello there", "1", "C1", "U1")).await;
        assert_eq!(result, ProcessingResult::empty());
    }

    #[tokio::test]
    async fn test_first_share_returns_links_but_no_response() {
        let (engine, _clock) = engine_with_clock(&RelinkConfig::default());
        let result = engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        assert_eq!(result.links_found, vec!["https://a.com/1"]);
        assert!(result.response.is_none());
    }

    #[tokio::test]
    async fn test_reshare_in_same_channel_names_first_sharer() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(60));

        let result = engine
            .process_message(&message("see <https://a.com/1>", "2", "C1", "U2"))
            .await;
        let response = result.response.unwrap();
        assert!(response.contains("this channel"), "got: {response}");
        assert!(response.contains("<@U1>"), "got: {response}");
    }

    #[tokio::test]
    async fn test_reshare_in_other_channel_references_original_channel() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(60));

        let result = engine
            .process_message(&message("see <https://a.com/1>", "2", "C2", "U2"))
            .await;
        let response = result.response.unwrap();
        assert!(response.contains("<#C1>"), "got: {response}");
    }

    #[tokio::test]
    async fn test_reshare_in_same_thread_says_in_this_thread() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        let mut first = message("see <https://a.com/1>", "1", "C1", "U1");
        first.thread_id = Some("T1".to_string());
        engine.process_message(&first).await;
        clock.advance(Duration::from_secs(60));

        let mut second = message("see <https://a.com/1>", "2", "C1", "U2");
        second.thread_id = Some("T1".to_string());
        let response = engine.process_message(&second).await.response.unwrap();
        assert!(response.contains("this thread"), "got: {response}");
        assert!(response.contains("<@U1>"), "got: {response}");
    }

    #[tokio::test]
    async fn test_reshare_within_recency_window_is_suppressed() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(3));

        let result = engine
            .process_message(&message("see <https://a.com/1>", "2", "C2", "U2"))
            .await;
        assert!(result.response.is_none());
    }

    #[tokio::test]
    async fn test_notifies_on_self_reshare_after_window() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(10));

        let result = engine
            .process_message(&message("again <https://a.com/1>", "2", "C1", "U1"))
            .await;
        assert!(result.response.is_some());
    }

    #[tokio::test]
    async fn test_allowlisted_link_never_notifies() {
        let config = RelinkConfig {
            allowlist: vec!["support.vendor.com".to_string()],
            ..RelinkConfig::default()
        };
        let (engine, clock) = engine_with_clock(&config);
        engine
            .process_message(&message("see <https://support.vendor.com/kb/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(60));

        let result = engine
            .process_message(&message("see <https://support.vendor.com/kb/1>", "2", "C2", "U2"))
            .await;
        assert!(result.response.is_none());
    }

    #[tokio::test]
    async fn test_scheme_variants_hit_the_same_record() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://www.a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(60));

        let result = engine
            .process_message(&message("see <http://a.com/1>", "2", "C1", "U2"))
            .await;
        assert!(result.response.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_notices_collapse() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        clock.advance(Duration::from_secs(60));

        // Two raw variants of the same canonical link in one message
        // produce one notice line, not two.
        let result = engine
            .process_message(&message(
                "see <https://a.com/1> or <http://www.a.com/1>",
                "2",
                "C1",
                "U2",
            ))
            .await;
        let response = result.response.unwrap();
        assert_eq!(response.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_deletion_removes_matching_record() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        engine
            .process_deletion(&DeletionEvent {
                deleted_message_id: "1".to_string(),
                channel_id: "C1".to_string(),
                previous_text: Some("see <https://a.com/1>".to_string()),
                previous_thread_id: None,
            })
            .await;
        clock.advance(Duration::from_secs(60));

        // Record is gone: the link reads as first-seen again.
        let result = engine
            .process_message(&message("see <https://a.com/1>", "2", "C1", "U2"))
            .await;
        assert!(result.response.is_none());
    }

    #[tokio::test]
    async fn test_deletion_of_other_message_leaves_record() {
        let (engine, clock) = engine_with_clock(&RelinkConfig::default());
        engine
            .process_message(&message("see <https://a.com/1>", "1", "C1", "U1"))
            .await;
        engine
            .process_deletion(&DeletionEvent {
                deleted_message_id: "999".to_string(),
                channel_id: "C1".to_string(),
                previous_text: Some("see <https://a.com/1>".to_string()),
                previous_thread_id: None,
            })
            .await;
        clock.advance(Duration::from_secs(60));

        let result = engine
            .process_message(&message("see <https://a.com/1>", "2", "C1", "U2"))
            .await;
        assert!(result.response.is_some());
    }
}

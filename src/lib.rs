//! # Relink
//!
//! Link re-share detection core for community chat bots.
//!
//! Relink scans chat messages for URLs, decides which ones are intentional
//! shares (as opposed to casual domain mentions), normalizes them into a
//! canonical key, and tracks where and when each canonical link was last
//! seen so the host bot can notify participants when a link resurfaces.
//!
//! ## Pipeline
//!
//! raw message → [`LinkExtractor`] → raw links → (per link, in parallel)
//! [`services::canonical::normalize`] → [`LinkStore`] lookup →
//! [`ResharingEngine`] decision ladder → aggregated response + store writes.
//!
//! The crate is a library invoked by a webhook handler; it never talks to
//! the chat network or to storage directly. Storage is supplied by the host
//! through the [`KeyValueBackend`] trait.
//!
//! ## Example
//!
//! ```rust,ignore
//! use relink::{InMemoryBackend, MessageEvent, RelinkConfig, ResharingEngine};
//!
//! let engine = ResharingEngine::new(InMemoryBackend::with_defaults(), &RelinkConfig::default());
//! let result = engine.process_message(&MessageEvent {
//!     text: "Check out <https://www.phoronix.com/news/X>".to_string(),
//!     id: "1719855600.000100".to_string(),
//!     channel_id: "C0GENERAL".to_string(),
//!     user_id: "U0ALICE".to_string(),
//!     thread_id: None,
//! }).await;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::RelinkConfig;
pub use models::{
    CanonicalKey, DeletionEvent, LinkProvenance, MessageEvent, ProcessingResult,
};
pub use services::{
    Clock, LinkExtractor, ManualClock, ResharingEngine, SystemClock, is_intentional_link,
    normalize,
};
pub use storage::{InMemoryBackend, KeyValueBackend, LinkStore, RedisBackend};

/// Error type for relink operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// Note that the message-processing surface ([`ResharingEngine`]) never
/// surfaces these errors to the caller: storage failures degrade to
/// "link not seen before" on reads and are logged per link on writes.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed configuration file, invalid backend parameters |
/// | `OperationFailed` | Backend I/O errors, serialization failures |
/// | `FeatureNotEnabled` | Constructing a backend behind a disabled cargo feature |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The key-value collaborator returns an I/O error
    /// - A provenance record fails to serialize
    /// - Logging initialization fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A feature required for this operation is not enabled.
    ///
    /// Raised when constructing the Redis backend without the `redis`
    /// cargo feature.
    #[error("feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

/// Result type alias for relink operations.
pub type Result<T> = std::result::Result<T, Error>;

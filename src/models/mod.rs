//! Data models for relink.
//!
//! This module contains the core data structures used throughout the system.

mod link;
mod message;

pub use link::{CanonicalKey, LinkProvenance};
pub use message::{DeletionEvent, MessageEvent, ProcessingResult};

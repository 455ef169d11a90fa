//! Core services: canonicalization, intent classification, extraction,
//! and the resharing orchestrator.

pub mod canonical;
pub mod clock;
pub mod extract;
pub mod intent;
pub mod reshare;

pub use canonical::{clean_token, normalize};
pub use clock::{Clock, ManualClock, SystemClock};
pub use extract::LinkExtractor;
pub use intent::is_intentional_link;
pub use reshare::ResharingEngine;

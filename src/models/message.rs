//! Inbound event and response types.
//!
//! The host transport decodes chat events into these shapes before handing
//! them to the [`crate::ResharingEngine`]; the core never sees the wire
//! format of the chat product.

use serde::{Deserialize, Serialize};

/// A decoded chat message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Raw message text, including chat formatting.
    pub text: String,
    /// Message identifier.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Author of the message.
    pub user_id: String,
    /// Parent thread identifier, if the message is a thread reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// A decoded message-deletion event.
///
/// `previous_text` carries the text of the deleted message when the chat
/// product supplies it; without it there is nothing to clean up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionEvent {
    /// Identifier of the deleted message.
    pub deleted_message_id: String,
    /// Channel the message was deleted from.
    pub channel_id: String,
    /// Text of the deleted message, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_text: Option<String>,
    /// Thread the deleted message belonged to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_thread_id: Option<String>,
}

/// Aggregated outcome of processing one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingResult {
    /// Raw links found in the message, in extraction order.
    pub links_found: Vec<String>,
    /// Aggregated notification text, one unique line per re-shared link.
    ///
    /// `None` when no link warranted a notification.
    pub response: Option<String>,
}

impl ProcessingResult {
    /// A result carrying no links and no response.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            links_found: Vec::new(),
            response: None,
        }
    }
}

//! Conversation message stream
//!
//! One request produces an ordered stream mixing control messages
//! (transfer notices) and content messages. The supervisor filters the
//! stream before anything reaches the caller; nothing here persists
//! across requests.

use serde::{Deserialize, Serialize};

/// One entry in a request's message stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who emitted the message ("user", "supervisor", or a handler name).
    pub source: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

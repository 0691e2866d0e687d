//! Inbound message model.
//!
//! The pipeline works on a transport-agnostic value; the Telegram types
//! only appear at the conversion boundary.

use teloxide::types::Chat;

/// Where a message came from. A closed set: anything the transport
/// delivers outside these kinds is skipped unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One-to-one chat with the bot.
    Direct,
    /// Small multi-party group.
    Group,
    /// Large multi-party room (supergroup).
    Room,
}

impl SourceKind {
    /// Multi-party chats require an explicit mention before the bot replies.
    pub fn is_multi_party(self) -> bool {
        matches!(self, Self::Group | Self::Room)
    }
}

/// One inbound text message. Immutable; lives for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    pub source: SourceKind,
    /// Identifier of the originating chat, used for logging.
    pub source_id: String,
}

impl InboundMessage {
    pub fn direct(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: SourceKind::Direct,
            source_id: format!("user:{chat_id}"),
        }
    }

    pub fn group(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: SourceKind::Group,
            source_id: format!("group:{chat_id}"),
        }
    }

    pub fn room(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: SourceKind::Room,
            source_id: format!("room:{chat_id}"),
        }
    }

    /// Build from a Telegram chat. Returns `None` for chat kinds the bot
    /// never answers (channels, etc.).
    pub fn from_chat(chat: &Chat, text: &str) -> Option<Self> {
        if chat.is_private() {
            Some(Self::direct(chat.id.0, text))
        } else if chat.is_group() {
            Some(Self::group(chat.id.0, text))
        } else if chat.is_supergroup() {
            Some(Self::room(chat.id.0, text))
        } else {
            None
        }
    }
}

//! Row models persisted in the relational store.
//!
//! These are storage-level shapes: optional columns stay `Option`. The
//! client-facing views (with empty-string defaults and display fallbacks) are
//! built from them by the domain core.

use chrono::{DateTime, Utc};
use parley_shared::{
    CommentId, ConversationId, ConversationKind, MessageId, MessageKind, MessageStatus, UserId,
};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Display name, unique across all users.
    pub username: String,
    pub photo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub kind: ConversationKind,
    /// Only ever set on groups.
    pub name: Option<String>,
    /// Only ever set on groups.
    pub photo_url: Option<String>,
}

/// Input for [`crate::Database::create_conversation`].
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    /// Final, de-duplicated participant set.
    pub participants: Vec<UserId>,
}

/// One member of a conversation, joined with the member's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub conversation_id: ConversationId,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A message joined with its sender's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: User,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    pub content: String,
    pub reply_to: Option<MessageId>,
}

/// Input for [`crate::Database::send_message`]. New messages always start as
/// [`MessageStatus::Received`].
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub kind: MessageKind,
    pub content: String,
    pub reply_to: Option<MessageId>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment joined with its sender's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub message_id: MessageId,
    pub sender: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

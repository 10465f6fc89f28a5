//! Message lifecycle: send, fetch, delete, forward and the conversation-wide
//! read sweep.

use chrono::Utc;
use parley_shared::{ConversationId, MessageId, MessageKind, MessageView, UserId};
use parley_store::{Database, NewMessage};
use tracing::{debug, info};

use crate::compose::message_view;
use crate::error::{CoreError, Result};
use crate::guard;

/// A message as submitted by a client.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    /// `"text"` or `"media"`.
    pub kind: String,
    pub content: String,
    /// `None` and `Some(MessageId(0))` both mean "not a reply".
    pub reply_to: Option<MessageId>,
}

impl MessageDraft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text.as_str().to_string(),
            content: content.into(),
            reply_to: None,
        }
    }

    pub fn replying_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }
}

/// Post a message as `sender` and return it as persisted.
pub fn send(
    db: &Database,
    conversation: ConversationId,
    sender: UserId,
    draft: MessageDraft,
) -> Result<MessageView> {
    guard::require_participant(db, conversation, sender)?;

    let kind: MessageKind = draft
        .kind
        .parse()
        .map_err(|_| CoreError::BadRequest("type must be 'text' or 'media'".into()))?;
    if draft.content.is_empty() {
        return Err(CoreError::BadRequest("content must not be empty".into()));
    }
    let reply_to = draft.reply_to.filter(|id| id.0 != 0);
    if let Some(target) = reply_to {
        if !db.message_exists(conversation, target)? {
            return Err(CoreError::BadRequest(
                "replyTo must reference a message of this conversation".into(),
            ));
        }
    }

    insert(db, conversation, sender, kind, draft.content, reply_to)
}

fn insert(
    db: &Database,
    conversation: ConversationId,
    sender: UserId,
    kind: MessageKind,
    content: String,
    reply_to: Option<MessageId>,
) -> Result<MessageView> {
    let stored = db.send_message(&NewMessage {
        conversation_id: conversation,
        sender_id: sender,
        kind,
        content,
        reply_to,
        timestamp: Utc::now(),
    })?;
    info!(
        conversation = %conversation,
        message = %stored.id,
        sender = %sender,
        kind = %kind,
        "message sent"
    );
    Ok(message_view(stored))
}

pub fn get(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    requester: UserId,
) -> Result<MessageView> {
    guard::require_participant(db, conversation, requester)?;
    let stored = db
        .get_message(conversation, message)
        .map_err(|e| match CoreError::from(e) {
            CoreError::NotFound(_) => CoreError::NotFound("message not found".into()),
            other => other,
        })?;
    Ok(message_view(stored))
}

/// Delete a message. Only its sender may do so.
pub fn delete(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    requester: UserId,
) -> Result<()> {
    guard::require_participant(db, conversation, requester)?;

    if !db.message_exists(conversation, message)? {
        return Err(CoreError::NotFound("message not found".into()));
    }
    if !guard::is_sender(db, message, requester)? {
        return Err(CoreError::Forbidden(
            "only the sender can delete a message".into(),
        ));
    }
    if !db.delete_message(conversation, message)? {
        return Err(CoreError::NotFound("message not found".into()));
    }

    info!(conversation = %conversation, message = %message, user = %requester, "message deleted");
    Ok(())
}

/// Re-send the kind and content of `message` into `target` as `requester`.
/// The original is left untouched and no reply link is carried over.
pub fn forward(
    db: &Database,
    source: ConversationId,
    message: MessageId,
    target: ConversationId,
    requester: UserId,
) -> Result<MessageView> {
    guard::require_participant(db, source, requester)?;
    guard::require_participant(db, target, requester)?;

    let original = get(db, source, message, requester)?;
    let forwarded = insert(db, target, requester, original.kind, original.content, None)?;
    debug!(from = %message, to = %forwarded.id, "message forwarded");
    Ok(forwarded)
}

/// Mark every message of `conversation` not sent by `reader` as read.
pub fn mark_read(db: &Database, conversation: ConversationId, reader: UserId) -> Result<usize> {
    guard::require_participant(db, conversation, reader)?;
    let updated = db.mark_read(conversation, reader)?;
    debug!(conversation = %conversation, user = %reader, updated, "messages marked read");
    Ok(updated)
}

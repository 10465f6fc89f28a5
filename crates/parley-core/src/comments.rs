//! Comments attached to messages. Every operation is scoped to the
//! conversation that owns the message.

use chrono::Utc;
use parley_shared::{CommentId, CommentView, ConversationId, MessageId, UserId};
use parley_store::{Database, NewComment};
use tracing::info;

use crate::compose::comment_view;
use crate::error::{CoreError, Result};
use crate::guard;

fn require_message(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    user: UserId,
) -> Result<()> {
    guard::require_participant(db, conversation, user)?;
    if db.message_exists(conversation, message)? {
        Ok(())
    } else {
        Err(CoreError::NotFound("message not found".into()))
    }
}

pub fn add(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    sender: UserId,
    content: &str,
) -> Result<CommentView> {
    require_message(db, conversation, message, sender)?;
    if content.is_empty() {
        return Err(CoreError::BadRequest("content must not be empty".into()));
    }

    let stored = db.add_comment(&NewComment {
        message_id: message,
        sender_id: sender,
        content: content.to_string(),
        timestamp: Utc::now(),
    })?;
    info!(message = %message, comment = %stored.id, sender = %sender, "comment added");
    Ok(comment_view(stored))
}

/// Comments of a message, oldest first.
pub fn list(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    requester: UserId,
) -> Result<Vec<CommentView>> {
    require_message(db, conversation, message, requester)?;
    Ok(db
        .list_comments(message)?
        .into_iter()
        .map(comment_view)
        .collect())
}

/// Only the author can delete a comment. Someone else's comment is reported
/// as [`CoreError::NotFound`], the same as a missing one.
pub fn delete(
    db: &Database,
    conversation: ConversationId,
    message: MessageId,
    comment: CommentId,
    requester: UserId,
) -> Result<()> {
    require_message(db, conversation, message, requester)?;
    if !db.delete_comment(message, comment, requester)? {
        return Err(CoreError::NotFound("comment not found".into()));
    }
    info!(message = %message, comment = %comment, user = %requester, "comment deleted");
    Ok(())
}

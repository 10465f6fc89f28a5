//! View composition: turns normalized store rows into the client-facing
//! shapes of [`parley_shared::views`].
//!
//! Everything here is pure. Managers fetch rows with set-returning queries
//! and hand them over; grouping and fallbacks happen in application code.

use std::cmp::Reverse;
use std::collections::HashMap;

use parley_shared::{
    CommentView, ConversationDetail, ConversationId, ConversationKind, ConversationView,
    MessageView, UserId, UserView,
};
use parley_store::{Comment, Conversation, Message, Participant, User};

pub fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        photo_url: user.photo_url.unwrap_or_default(),
    }
}

pub fn message_view(message: Message) -> MessageView {
    MessageView {
        id: message.id,
        conversation_id: message.conversation_id,
        kind: message.kind,
        sender: user_view(message.sender),
        timestamp: message.timestamp,
        status: message.status,
        content: message.content,
        reply_to: message.reply_to,
    }
}

pub fn comment_view(comment: Comment) -> CommentView {
    CommentView {
        id: comment.id,
        message_id: comment.message_id,
        content: comment.content,
        sender: user_view(comment.sender),
        timestamp: comment.timestamp,
    }
}

/// Build one conversation descriptor as seen by `viewer`.
///
/// For a direct conversation without an explicit name or photo, the display
/// name and photo fall back to those of the other participant.
pub fn conversation_view(
    viewer: UserId,
    conversation: Conversation,
    participants: Vec<User>,
    latest: Option<Message>,
) -> ConversationView {
    let mut name = conversation.name.unwrap_or_default();
    let mut photo_url = conversation.photo_url.unwrap_or_default();

    if conversation.kind == ConversationKind::Direct {
        if let Some(other) = participants.iter().find(|u| u.id != viewer) {
            if name.is_empty() {
                name = other.username.clone();
            }
            if photo_url.is_empty() {
                photo_url = other.photo_url.clone().unwrap_or_default();
            }
        }
    }

    ConversationView {
        id: conversation.id,
        kind: conversation.kind,
        participants: participants.into_iter().map(user_view).collect(),
        latest_message: latest.map(message_view),
        name,
        photo_url,
    }
}

/// Assemble the conversation list of `viewer`.
///
/// `participants` and `latest` may cover the conversations in any order;
/// conversations with no entry in `latest` get no preview. The result is
/// ordered by most recent activity, conversations without messages last in
/// their incoming order.
pub fn conversation_list(
    viewer: UserId,
    conversations: Vec<Conversation>,
    participants: Vec<Participant>,
    latest: Vec<Message>,
) -> Vec<ConversationView> {
    let mut members: HashMap<ConversationId, Vec<User>> = HashMap::new();
    for p in participants {
        members.entry(p.conversation_id).or_default().push(p.user);
    }

    let mut previews: HashMap<ConversationId, Message> = HashMap::new();
    for m in latest {
        // Keep the newest if a conversation shows up twice.
        match previews.get(&m.conversation_id) {
            Some(existing) if (existing.timestamp, existing.id) >= (m.timestamp, m.id) => {}
            _ => {
                previews.insert(m.conversation_id, m);
            }
        }
    }

    let mut views: Vec<ConversationView> = conversations
        .into_iter()
        .map(|c| {
            let users = members.remove(&c.id).unwrap_or_default();
            let preview = previews.remove(&c.id);
            conversation_view(viewer, c, users, preview)
        })
        .collect();

    views.sort_by_key(|v| {
        Reverse(
            v.latest_message
                .as_ref()
                .map(|m| (m.timestamp, m.id)),
        )
    });
    views
}

/// Descriptor plus full history, oldest message first.
pub fn conversation_detail(
    viewer: UserId,
    conversation: Conversation,
    participants: Vec<User>,
    messages: Vec<Message>,
) -> ConversationDetail {
    let mut messages: Vec<MessageView> = messages.into_iter().map(message_view).collect();
    messages.sort_by_key(|m| (m.timestamp, m.id));

    ConversationDetail {
        conversation: conversation_view(viewer, conversation, participants, None),
        messages,
    }
}

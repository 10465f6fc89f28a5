//! Client-facing shapes returned by the HTTP API.
//!
//! Optional textual fields (names, photo URLs) are always present and default
//! to the empty string; they are never serialized as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CommentId, ConversationId, ConversationKind, MessageId, MessageKind, MessageStatus, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sender: UserView,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

/// One entry of a conversation list, or the descriptor of a detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: ConversationId,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub participants: Vec<UserView>,
    /// Preview: the most recent message, absent for an empty conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<MessageView>,
    pub name: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationDetail {
    pub conversation: ConversationView,
    /// Ascending by timestamp.
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub message_id: MessageId,
    pub content: String,
    pub sender: UserView,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alice() -> UserView {
        UserView {
            id: UserId(1),
            username: "alice".into(),
            photo_url: String::new(),
        }
    }

    #[test]
    fn test_conversation_view_shape() {
        let view = ConversationView {
            id: ConversationId(10),
            kind: ConversationKind::Direct,
            participants: vec![alice()],
            latest_message: None,
            name: String::new(),
            photo_url: String::new(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["name"], "");
        assert_eq!(json["photoUrl"], "");
        assert_eq!(json["participants"][0]["photoUrl"], "");
        assert!(json.get("latestMessage").is_none());
    }

    #[test]
    fn test_message_view_shape() {
        let msg = MessageView {
            id: MessageId(100),
            conversation_id: ConversationId(10),
            kind: MessageKind::Text,
            sender: alice(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            status: MessageStatus::Received,
            content: "hello".into(),
            reply_to: None,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["status"], "received");
        assert_eq!(json["conversationId"], 10);
        assert_eq!(json["sender"]["username"], "alice");
        assert!(json.get("replyTo").is_none());

        let reply = MessageView {
            reply_to: Some(MessageId(99)),
            ..msg
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["replyTo"], 99);
    }
}

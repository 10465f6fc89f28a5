use rusqlite::{params, Connection, OptionalExtension};

use parley_shared::{ConversationId, MessageId, MessageStatus, UserId};

use crate::database::Database;
use crate::error::Result;
use crate::models::{Message, NewMessage};
use crate::rows::{decode_message, format_timestamp, query_one, query_rows, MESSAGE_COLUMNS};

const SELECT_MESSAGE: &str = "
    SELECT m.id, m.conversation_id, m.sender_id, m.type, m.timestamp, m.status,
           m.content, m.reply_to,
           u.username AS sender_username, u.photo_url AS sender_photo_url
    FROM messages m
    JOIN users u ON u.id = m.sender_id";

impl Database {
    /// Insert a message and read the stored row back in the same transaction.
    pub fn send_message(&self, new: &NewMessage) -> Result<Message> {
        self.transaction(|tx| {
            let id: i64 = tx.query_row(
                "INSERT INTO messages
                     (conversation_id, sender_id, type, timestamp, status, content, reply_to)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id",
                params![
                    new.conversation_id.0,
                    new.sender_id.0,
                    new.kind.as_str(),
                    format_timestamp(&new.timestamp),
                    MessageStatus::Received.as_str(),
                    new.content,
                    new.reply_to.map(|r| r.0),
                ],
                |row| row.get(0),
            )?;
            get_message(tx, new.conversation_id, MessageId(id))
        })
    }

    /// A message scoped to its conversation; a message of another
    /// conversation is [`crate::StoreError::NotFound`].
    pub fn get_message(&self, conversation: ConversationId, id: MessageId) -> Result<Message> {
        let conn = self.conn()?;
        get_message(&conn, conversation, id)
    }

    pub fn message_exists(&self, conversation: ConversationId, id: MessageId) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM messages WHERE conversation_id = ?1 AND id = ?2",
                params![conversation.0, id.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Full history of a conversation, oldest first.
    pub fn list_messages(&self, conversation: ConversationId) -> Result<Vec<Message>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            &format!(
                "{SELECT_MESSAGE}
                 WHERE m.conversation_id = ?1
                 ORDER BY m.timestamp ASC, m.id ASC"
            ),
            params![conversation.0],
            MESSAGE_COLUMNS,
            decode_message,
        )
    }

    /// The most recent message of every conversation `user` takes part in.
    /// Conversations without messages contribute no row.
    pub fn latest_messages_for_member(&self, user: UserId) -> Result<Vec<Message>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            &format!(
                "{SELECT_MESSAGE}
                 WHERE m.id IN (
                     SELECT (
                         SELECT m2.id FROM messages m2
                         WHERE m2.conversation_id = p.conversation_id
                         ORDER BY m2.timestamp DESC, m2.id DESC
                         LIMIT 1
                     )
                     FROM participants p
                     WHERE p.user_id = ?1
                 )"
            ),
            params![user.0],
            MESSAGE_COLUMNS,
            decode_message,
        )
    }

    pub fn is_sender(&self, id: MessageId, user: UserId) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM messages WHERE id = ?1 AND sender_id = ?2",
                params![id.0, user.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Mark every `received` message of the conversation not sent by `reader`
    /// as `read`. Returns the number of messages that changed.
    pub fn mark_read(&self, conversation: ConversationId, reader: UserId) -> Result<usize> {
        let affected = self.conn()?.execute(
            "UPDATE messages SET status = ?1
             WHERE conversation_id = ?2 AND sender_id != ?3 AND status = ?4",
            params![
                MessageStatus::Read.as_str(),
                conversation.0,
                reader.0,
                MessageStatus::Received.as_str(),
            ],
        )?;
        Ok(affected)
    }

    /// Hard delete. Comments go with the message (ON DELETE CASCADE); replies
    /// to it keep existing with `reply_to` cleared.
    pub fn delete_message(&self, conversation: ConversationId, id: MessageId) -> Result<bool> {
        let affected = self.conn()?.execute(
            "DELETE FROM messages WHERE conversation_id = ?1 AND id = ?2",
            params![conversation.0, id.0],
        )?;
        Ok(affected > 0)
    }
}

pub(crate) fn get_message(
    conn: &Connection,
    conversation: ConversationId,
    id: MessageId,
) -> Result<Message> {
    query_one(
        conn,
        &format!("{SELECT_MESSAGE} WHERE m.conversation_id = ?1 AND m.id = ?2"),
        params![conversation.0, id.0],
        MESSAGE_COLUMNS,
        decode_message,
    )
}

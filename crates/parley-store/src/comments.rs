use rusqlite::{params, Connection};

use parley_shared::{CommentId, MessageId, UserId};

use crate::database::Database;
use crate::error::Result;
use crate::models::{Comment, NewComment};
use crate::rows::{decode_comment, format_timestamp, query_one, query_rows, COMMENT_COLUMNS};

const SELECT_COMMENT: &str = "
    SELECT c.id, c.message_id, c.sender_id, c.content, c.timestamp,
           u.username AS sender_username, u.photo_url AS sender_photo_url
    FROM comments c
    JOIN users u ON u.id = c.sender_id";

impl Database {
    /// Insert a comment and read the stored row back in the same transaction.
    pub fn add_comment(&self, new: &NewComment) -> Result<Comment> {
        self.transaction(|tx| {
            let id: i64 = tx.query_row(
                "INSERT INTO comments (message_id, sender_id, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
                params![
                    new.message_id.0,
                    new.sender_id.0,
                    new.content,
                    format_timestamp(&new.timestamp),
                ],
                |row| row.get(0),
            )?;
            get_comment(tx, CommentId(id))
        })
    }

    /// Comments of a message, oldest first.
    pub fn list_comments(&self, message: MessageId) -> Result<Vec<Comment>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            &format!(
                "{SELECT_COMMENT}
                 WHERE c.message_id = ?1
                 ORDER BY c.timestamp ASC, c.id ASC"
            ),
            params![message.0],
            COMMENT_COLUMNS,
            decode_comment,
        )
    }

    /// Delete a comment only if it belongs to `message` and was written by
    /// `sender`. The ownership check and the delete share one transaction.
    ///
    /// Returns `false` when nothing matched, without telling apart "absent"
    /// from "not yours".
    pub fn delete_comment(
        &self,
        message: MessageId,
        comment: CommentId,
        sender: UserId,
    ) -> Result<bool> {
        self.transaction(|tx| {
            let owned: i64 = tx.query_row(
                "SELECT COUNT(*) FROM comments
                 WHERE id = ?1 AND message_id = ?2 AND sender_id = ?3",
                params![comment.0, message.0, sender.0],
                |row| row.get(0),
            )?;
            if owned == 0 {
                return Ok(false);
            }

            let affected = tx.execute(
                "DELETE FROM comments WHERE id = ?1 AND message_id = ?2 AND sender_id = ?3",
                params![comment.0, message.0, sender.0],
            )?;
            Ok(affected > 0)
        })
    }
}

fn get_comment(conn: &Connection, id: CommentId) -> Result<Comment> {
    query_one(
        conn,
        &format!("{SELECT_COMMENT} WHERE c.id = ?1"),
        params![id.0],
        COMMENT_COLUMNS,
        decode_comment,
    )
}

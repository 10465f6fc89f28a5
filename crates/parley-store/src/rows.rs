//! Typed row decoding.
//!
//! Every query shape the store issues has one column list constant and one
//! decoder here. [`query_rows`] and [`query_one`] check the prepared
//! statement's column names against that list before mapping any row, so a
//! drifting query fails loudly with [`StoreError::Schema`] instead of
//! silently mis-assigning fields.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row, Statement};

use parley_shared::{CommentId, ConversationId, MessageId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{Comment, Conversation, Message, Participant, User};

pub const USER_COLUMNS: &[&str] = &["id", "username", "photo_url"];

pub const CONVERSATION_COLUMNS: &[&str] = &["id", "type", "name", "photo_url"];

pub const PARTICIPANT_COLUMNS: &[&str] = &["conversation_id", "user_id", "username", "photo_url"];

pub const MESSAGE_COLUMNS: &[&str] = &[
    "id",
    "conversation_id",
    "sender_id",
    "type",
    "timestamp",
    "status",
    "content",
    "reply_to",
    "sender_username",
    "sender_photo_url",
];

pub const COMMENT_COLUMNS: &[&str] = &[
    "id",
    "message_id",
    "sender_id",
    "content",
    "timestamp",
    "sender_username",
    "sender_photo_url",
];

/// Decoder signature shared by every query shape.
pub type Decoder<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// Format a timestamp for storage. Fixed precision and a `Z` suffix keep the
/// textual order identical to the chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Fail unless `stmt` yields exactly `expected`, in order.
pub fn expect_columns(stmt: &Statement<'_>, expected: &[&str]) -> Result<()> {
    let actual = stmt.column_names();
    if actual.len() != expected.len() || actual.iter().zip(expected).any(|(a, e)| a != e) {
        return Err(StoreError::Schema(format!(
            "expected columns {expected:?}, got {actual:?}"
        )));
    }
    Ok(())
}

pub fn query_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    expected: &[&str],
    decode: Decoder<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    expect_columns(&stmt, expected)?;
    let rows = stmt.query_map(params, decode)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(StoreError::Sqlite)
}

/// Like [`query_rows`] but for exactly one row; no row is [`StoreError::NotFound`].
pub fn query_one<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    expected: &[&str],
    decode: Decoder<T>,
) -> Result<T> {
    let mut stmt = conn.prepare_cached(sql)?;
    expect_columns(&stmt, expected)?;
    stmt.query_row(params, decode).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    })
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

pub fn decode_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get("id")?),
        username: row.get("username")?,
        photo_url: row.get("photo_url")?,
    })
}

pub fn decode_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: ConversationId(row.get("id")?),
        kind: parse_column(row, "type")?,
        name: row.get("name")?,
        photo_url: row.get("photo_url")?,
    })
}

pub fn decode_participant(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        conversation_id: ConversationId(row.get("conversation_id")?),
        user: User {
            id: UserId(row.get("user_id")?),
            username: row.get("username")?,
            photo_url: row.get("photo_url")?,
        },
    })
}

pub fn decode_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let reply_to: Option<i64> = row.get("reply_to")?;
    Ok(Message {
        id: MessageId(row.get("id")?),
        conversation_id: ConversationId(row.get("conversation_id")?),
        sender: User {
            id: UserId(row.get("sender_id")?),
            username: row.get("sender_username")?,
            photo_url: row.get("sender_photo_url")?,
        },
        kind: parse_column(row, "type")?,
        timestamp: timestamp_column(row, "timestamp")?,
        status: parse_column(row, "status")?,
        content: row.get("content")?,
        reply_to: MessageId::non_zero(reply_to),
    })
}

pub fn decode_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.get("id")?),
        message_id: MessageId(row.get("message_id")?),
        sender: User {
            id: UserId(row.get("sender_id")?),
            username: row.get("sender_username")?,
            photo_url: row.get("sender_photo_url")?,
        },
        content: row.get("content")?,
        timestamp: timestamp_column(row, "timestamp")?,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_column<T>(row: &Row<'_>, name: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let idx = row.as_ref().column_index(name)?;
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, name: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(name)?;
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parley_shared::{ConversationKind, MessageKind, MessageStatus};

    fn conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_decode_user_fixture() {
        let user = query_one(
            &conn(),
            "SELECT 7 AS id, 'alice' AS username, NULL AS photo_url",
            [],
            USER_COLUMNS,
            decode_user,
        )
        .unwrap();

        assert_eq!(
            user,
            User {
                id: UserId(7),
                username: "alice".into(),
                photo_url: None,
            }
        );
    }

    #[test]
    fn test_decode_conversation_fixture() {
        let conv = query_one(
            &conn(),
            "SELECT 3 AS id, 'group' AS type, 'friends' AS name, 'http://x/p.png' AS photo_url",
            [],
            CONVERSATION_COLUMNS,
            decode_conversation,
        )
        .unwrap();

        assert_eq!(conv.id, ConversationId(3));
        assert_eq!(conv.kind, ConversationKind::Group);
        assert_eq!(conv.name.as_deref(), Some("friends"));
    }

    #[test]
    fn test_decode_participants_fixture() {
        let rows = query_rows(
            &conn(),
            "SELECT 3 AS conversation_id, 1 AS user_id, 'alice' AS username, NULL AS photo_url
             UNION ALL
             SELECT 3, 2, 'bob', 'http://x/bob.png'",
            [],
            PARTICIPANT_COLUMNS,
            decode_participant,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].user.username, "bob");
        assert_eq!(rows[1].user.photo_url.as_deref(), Some("http://x/bob.png"));
    }

    #[test]
    fn test_decode_message_fixture() {
        let msg = query_one(
            &conn(),
            "SELECT 100 AS id, 10 AS conversation_id, 1 AS sender_id, 'text' AS type,
                    '2024-05-01T12:00:00.000000Z' AS timestamp, 'read' AS status,
                    'hello' AS content, 0 AS reply_to,
                    'alice' AS sender_username, NULL AS sender_photo_url",
            [],
            MESSAGE_COLUMNS,
            decode_message,
        )
        .unwrap();

        assert_eq!(msg.id, MessageId(100));
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.status, MessageStatus::Read);
        assert_eq!(msg.sender.username, "alice");
        assert_eq!(msg.reply_to, None);
        assert_eq!(msg.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_comment_fixture() {
        let comment = query_one(
            &conn(),
            "SELECT 5 AS id, 100 AS message_id, 2 AS sender_id, 'nice' AS content,
                    '2024-05-01T12:00:01.000000Z' AS timestamp,
                    'bob' AS sender_username, NULL AS sender_photo_url",
            [],
            COMMENT_COLUMNS,
            decode_comment,
        )
        .unwrap();

        assert_eq!(comment.id, CommentId(5));
        assert_eq!(comment.sender.id, UserId(2));
        assert_eq!(comment.content, "nice");
    }

    #[test]
    fn test_unknown_enum_value_is_conversion_error() {
        let err = query_one(
            &conn(),
            "SELECT 100 AS id, 10 AS conversation_id, 1 AS sender_id, 'video' AS type,
                    '2024-05-01T12:00:00.000000Z' AS timestamp, 'read' AS status,
                    'x' AS content, NULL AS reply_to,
                    'alice' AS sender_username, NULL AS sender_photo_url",
            [],
            MESSAGE_COLUMNS,
            decode_message,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(3, _, _))
        ));
    }

    #[test]
    fn test_column_mismatch_is_schema_error() {
        let err = query_one(
            &conn(),
            "SELECT 7 AS id, 'alice' AS name, NULL AS photo_url",
            [],
            USER_COLUMNS,
            decode_user,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));

        let err = query_rows(
            &conn(),
            "SELECT 7 AS id, 'alice' AS username",
            [],
            USER_COLUMNS,
            decode_user,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }

    #[test]
    fn test_no_row_is_not_found() {
        let err = query_one(
            &conn(),
            "SELECT 7 AS id, 'alice' AS username, NULL AS photo_url WHERE 0",
            [],
            USER_COLUMNS,
            decode_user,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 9, 59, 59).unwrap();
        let late = early + chrono::Duration::microseconds(1);
        assert!(format_timestamp(&early) < format_timestamp(&late));
        assert_eq!(format_timestamp(&early), "2024-05-01T09:59:59.000000Z");
    }
}

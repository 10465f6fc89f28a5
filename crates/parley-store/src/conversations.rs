//! CRUD operations for [`Conversation`] and participant records.

use rusqlite::{params, Connection, OptionalExtension};

use parley_shared::{ConversationId, ConversationKind, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Conversation, NewConversation, Participant, User};
use crate::rows::{
    decode_conversation, decode_participant, decode_user, query_one, query_rows,
    CONVERSATION_COLUMNS, PARTICIPANT_COLUMNS, USER_COLUMNS,
};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a conversation together with its initial participants.
    ///
    /// Either every row is written or none is: a failing participant insert
    /// (unknown user, duplicate pair) rolls the conversation back as well.
    pub fn create_conversation(&self, new: &NewConversation) -> Result<ConversationId> {
        self.transaction(|tx| {
            let id: i64 = tx.query_row(
                "INSERT INTO conversations (type, name, photo_url)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![new.kind.as_str(), new.name, new.photo_url],
                |row| row.get(0),
            )?;

            let mut stmt = tx.prepare_cached(
                "INSERT INTO participants (user_id, conversation_id) VALUES (?1, ?2)",
            )?;
            for user in &new.participants {
                stmt.execute(params![user.0, id])?;
            }

            Ok(ConversationId(id))
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_conversation(&self, id: ConversationId) -> Result<Conversation> {
        let conn = self.conn()?;
        query_one(
            &conn,
            "SELECT id, type, name, photo_url FROM conversations WHERE id = ?1",
            params![id.0],
            CONVERSATION_COLUMNS,
            decode_conversation,
        )
    }

    /// Kind of a conversation, `None` if it does not exist.
    pub fn conversation_kind(&self, id: ConversationId) -> Result<Option<ConversationKind>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT type FROM conversations WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| {
            s.parse::<ConversationKind>()
                .map_err(|e| StoreError::Schema(e.to_string()))
        })
        .transpose()
    }

    /// Conversations `user` takes part in, newest first.
    pub fn list_conversations_for(&self, user: UserId) -> Result<Vec<Conversation>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            "SELECT c.id, c.type, c.name, c.photo_url
             FROM conversations c
             JOIN participants p ON p.conversation_id = c.id
             WHERE p.user_id = ?1
             ORDER BY c.id DESC",
            params![user.0],
            CONVERSATION_COLUMNS,
            decode_conversation,
        )
    }

    /// Members of one conversation, ordered by user id.
    pub fn participants_of(&self, conversation: ConversationId) -> Result<Vec<User>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            "SELECT u.id, u.username, u.photo_url
             FROM participants p
             JOIN users u ON u.id = p.user_id
             WHERE p.conversation_id = ?1
             ORDER BY u.id ASC",
            params![conversation.0],
            USER_COLUMNS,
            decode_user,
        )
    }

    /// Members of every conversation `user` takes part in, as one flat
    /// set-returning query. Grouping by conversation happens in the caller.
    pub fn participants_for_member(&self, user: UserId) -> Result<Vec<Participant>> {
        let conn = self.conn()?;
        query_rows(
            &conn,
            "SELECT p.conversation_id, u.id AS user_id, u.username, u.photo_url
             FROM participants p
             JOIN users u ON u.id = p.user_id
             WHERE p.conversation_id IN (
                 SELECT conversation_id FROM participants WHERE user_id = ?1
             )
             ORDER BY p.conversation_id ASC, u.id ASC",
            params![user.0],
            PARTICIPANT_COLUMNS,
            decode_participant,
        )
    }

    pub fn is_participant(&self, conversation: ConversationId, user: UserId) -> Result<bool> {
        let conn = self.conn()?;
        is_participant(&conn, conversation, user)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Returns `false` if the pair already existed.
    pub fn add_participant(&self, conversation: ConversationId, user: UserId) -> Result<bool> {
        let affected = self.conn()?.execute(
            "INSERT INTO participants (user_id, conversation_id) VALUES (?1, ?2)
             ON CONFLICT(user_id, conversation_id) DO NOTHING",
            params![user.0, conversation.0],
        )?;
        Ok(affected > 0)
    }

    /// Returns `false` if the pair did not exist or `user` is the last
    /// participant; a conversation is never left without members.
    pub fn remove_participant(&self, conversation: ConversationId, user: UserId) -> Result<bool> {
        let affected = self.conn()?.execute(
            "DELETE FROM participants
             WHERE user_id = ?1 AND conversation_id = ?2
               AND (SELECT COUNT(*) FROM participants WHERE conversation_id = ?2) > 1",
            params![user.0, conversation.0],
        )?;
        Ok(affected > 0)
    }

    /// Rename a group. Direct conversations are never touched.
    pub fn set_group_name(&self, conversation: ConversationId, name: &str) -> Result<bool> {
        let affected = self.conn()?.execute(
            "UPDATE conversations SET name = ?1 WHERE id = ?2 AND type = 'group'",
            params![name, conversation.0],
        )?;
        Ok(affected > 0)
    }

    /// Set or clear a group photo. Direct conversations are never touched.
    pub fn set_group_photo(
        &self,
        conversation: ConversationId,
        photo_url: Option<&str>,
    ) -> Result<bool> {
        let affected = self.conn()?.execute(
            "UPDATE conversations SET photo_url = ?1 WHERE id = ?2 AND type = 'group'",
            params![photo_url, conversation.0],
        )?;
        Ok(affected > 0)
    }
}

pub(crate) fn is_participant(
    conn: &Connection,
    conversation: ConversationId,
    user: UserId,
) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM participants WHERE conversation_id = ?1 AND user_id = ?2",
            params![conversation.0, user.0],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(db: &Database, names: &[&str]) -> Vec<UserId> {
        names.iter().map(|n| db.login(n).unwrap().0).collect()
    }

    fn group(participants: Vec<UserId>) -> NewConversation {
        NewConversation {
            kind: ConversationKind::Group,
            name: Some("friends".into()),
            photo_url: None,
            participants,
        }
    }

    #[test]
    fn create_writes_every_participant() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice", "bob", "carol"]);

        let conv = db.create_conversation(&group(ids.clone())).unwrap();

        for id in &ids {
            assert!(db.is_participant(conv, *id).unwrap());
        }
        let members = db.participants_of(conv).unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(db.conversation_kind(conv).unwrap(), Some(ConversationKind::Group));
    }

    #[test]
    fn create_with_unknown_participant_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let mut ids = users(&db, &["alice"]);
        ids.push(UserId(404));

        let err = db.create_conversation(&group(ids)).unwrap_err();
        assert!(err.is_foreign_key_violation());

        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM participants", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn direct_conversation_rejects_name_at_store_level() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice", "bob"]);

        let result = db.create_conversation(&NewConversation {
            kind: ConversationKind::Direct,
            name: Some("nope".into()),
            photo_url: None,
            participants: ids,
        });
        assert!(result.is_err());
    }

    #[test]
    fn participants_for_member_covers_all_conversations() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice", "bob", "carol"]);
        let (alice, bob, carol) = (ids[0], ids[1], ids[2]);

        let a = db.create_conversation(&group(vec![alice, bob])).unwrap();
        let b = db.create_conversation(&group(vec![alice, carol])).unwrap();
        db.create_conversation(&group(vec![bob, carol])).unwrap();

        let rows = db.participants_for_member(alice).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|p| p.conversation_id == a || p.conversation_id == b));

        let listed = db.list_conversations_for(alice).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b);
    }

    #[test]
    fn add_and_remove_participant() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice", "bob"]);
        let conv = db.create_conversation(&group(vec![ids[0]])).unwrap();

        assert!(db.add_participant(conv, ids[1]).unwrap());
        assert!(!db.add_participant(conv, ids[1]).unwrap());
        assert!(db.is_participant(conv, ids[1]).unwrap());

        assert!(db.remove_participant(conv, ids[1]).unwrap());
        assert!(!db.remove_participant(conv, ids[1]).unwrap());
        assert!(!db.is_participant(conv, ids[1]).unwrap());
    }

    #[test]
    fn last_participant_is_kept() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice"]);
        let conv = db.create_conversation(&group(vec![ids[0]])).unwrap();

        assert!(!db.remove_participant(conv, ids[0]).unwrap());
        assert!(db.is_participant(conv, ids[0]).unwrap());
    }

    #[test]
    fn unknown_kind_is_a_schema_error() {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.conn().unwrap();
            conn.pragma_update(None, "ignore_check_constraints", "ON")
                .unwrap();
            conn.execute("INSERT INTO conversations (type) VALUES ('channel')", [])
                .unwrap();
        }

        assert!(matches!(
            db.conversation_kind(ConversationId(1)),
            Err(StoreError::Schema(_))
        ));
    }

    #[test]
    fn group_name_and_photo_only_apply_to_groups() {
        let db = Database::open_in_memory().unwrap();
        let ids = users(&db, &["alice", "bob"]);
        let g = db.create_conversation(&group(vec![ids[0]])).unwrap();
        let chat = db
            .create_conversation(&NewConversation {
                kind: ConversationKind::Direct,
                name: None,
                photo_url: None,
                participants: ids,
            })
            .unwrap();

        assert!(db.set_group_name(g, "renamed").unwrap());
        assert!(db.set_group_photo(g, Some("http://img/g.png")).unwrap());
        let stored = db.get_conversation(g).unwrap();
        assert_eq!(stored.name.as_deref(), Some("renamed"));
        assert_eq!(stored.photo_url.as_deref(), Some("http://img/g.png"));

        assert!(!db.set_group_name(chat, "renamed").unwrap());
        assert!(!db.set_group_photo(chat, Some("x")).unwrap());
        assert_eq!(db.get_conversation(chat).unwrap().name, None);
    }

    #[test]
    fn missing_conversation() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.conversation_kind(ConversationId(1)).unwrap(), None);
        assert!(matches!(
            db.get_conversation(ConversationId(1)),
            Err(StoreError::NotFound)
        ));
    }
}

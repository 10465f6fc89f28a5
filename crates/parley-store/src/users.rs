//! CRUD operations for [`User`] records.

use rusqlite::{params, Connection, OptionalExtension};

use parley_shared::UserId;

use crate::database::Database;
use crate::error::Result;
use crate::models::User;
use crate::rows::{decode_user, query_one, query_rows, USER_COLUMNS};

impl Database {
    /// Find the user with this display name, creating it if absent.
    ///
    /// Returns the id and whether a new row was created.
    pub fn login(&self, username: &str) -> Result<(UserId, bool)> {
        self.transaction(|tx| {
            let created = tx.execute(
                "INSERT INTO users (username) VALUES (?1)
                 ON CONFLICT(username) DO NOTHING",
                params![username],
            )? > 0;
            let id: i64 = tx.query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )?;
            Ok((UserId(id), created))
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        let conn = self.conn()?;
        get_user(&conn, id)
    }

    pub fn user_exists(&self, id: UserId) -> Result<bool> {
        let conn = self.conn()?;
        user_exists(&conn, id)
    }

    /// All users except `exclude`; restricted to an exact display name when
    /// `username` is given.
    pub fn search_users(&self, username: Option<&str>, exclude: UserId) -> Result<Vec<User>> {
        let conn = self.conn()?;
        match username {
            Some(name) => query_rows(
                &conn,
                "SELECT id, username, photo_url FROM users
                 WHERE username = ?1 AND id != ?2
                 ORDER BY username ASC",
                params![name, exclude.0],
                USER_COLUMNS,
                decode_user,
            ),
            None => query_rows(
                &conn,
                "SELECT id, username, photo_url FROM users
                 WHERE id != ?1
                 ORDER BY username ASC",
                params![exclude.0],
                USER_COLUMNS,
                decode_user,
            ),
        }
    }

    /// Change a display name. A name already held by another user surfaces
    /// as a unique-constraint [`crate::StoreError`].
    pub fn set_username(&self, id: UserId, username: &str) -> Result<bool> {
        let affected = self.conn()?.execute(
            "UPDATE users SET username = ?1 WHERE id = ?2",
            params![username, id.0],
        )?;
        Ok(affected > 0)
    }

    /// Set or clear (`None`) a user's photo reference.
    pub fn set_user_photo(&self, id: UserId, photo_url: Option<&str>) -> Result<bool> {
        let affected = self.conn()?.execute(
            "UPDATE users SET photo_url = ?1 WHERE id = ?2",
            params![photo_url, id.0],
        )?;
        Ok(affected > 0)
    }
}

pub(crate) fn get_user(conn: &Connection, id: UserId) -> Result<User> {
    query_one(
        conn,
        "SELECT id, username, photo_url FROM users WHERE id = ?1",
        params![id.0],
        USER_COLUMNS,
        decode_user,
    )
}

pub(crate) fn user_exists(conn: &Connection, id: UserId) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", params![id.0], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

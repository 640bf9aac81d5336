use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str, avatar: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, avatar) VALUES (?1, ?2, ?3)",
                (username, password_hash, avatar),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &[&username]))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[&id]))
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        author_id: i64,
        inscription: &str,
        date_of_dispatch: &DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (author_id, inscription, date_of_dispatch) VALUES (?1, ?2, ?3)",
                rusqlite::params![author_id, inscription, date_of_dispatch.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Most recent messages first, joined with the author's name and avatar.
    pub fn get_recent_messages(&self, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.author_id, u.username, u.avatar, m.inscription, m.date_of_dispatch
                 FROM messages m
                 JOIN users u ON u.id = m.author_id
                 ORDER BY m.date_of_dispatch DESC, m.id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        author_id: row.get(1)?,
                        author_username: row.get(2)?,
                        author_avatar: row.get(3)?,
                        inscription: row.get(4)?,
                        date_of_dispatch: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, avatar, created_at FROM users WHERE {}",
        predicate
    );
    let row = conn
        .query_row(&sql, params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                avatar: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;
    Ok(row)
}

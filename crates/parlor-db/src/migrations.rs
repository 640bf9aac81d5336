use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            avatar      TEXT NOT NULL DEFAULT 'default.png',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id         INTEGER NOT NULL REFERENCES users(id),
            inscription       TEXT NOT NULL,
            date_of_dispatch  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_dispatch
            ON messages(date_of_dispatch);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

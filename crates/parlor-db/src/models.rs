/// Database row types — these map directly to SQLite rows.
/// Distinct from parlor-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub avatar: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub author_avatar: String,
    pub inscription: String,
    pub date_of_dispatch: String,
}

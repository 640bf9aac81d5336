use std::sync::Arc;

use parlor_db::Database;

use crate::submit::{CallerContext, Identity, IdentityResolver, MessageStore, NewMessage};

/// Resolves callers against the users table. A missing row is `Ok(None)`;
/// a failed lookup is an infrastructure error and propagates.
pub struct DbIdentityResolver {
    db: Arc<Database>,
}

impl DbIdentityResolver {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl IdentityResolver for DbIdentityResolver {
    fn resolve(&self, ctx: &CallerContext) -> anyhow::Result<Option<Identity>> {
        let row = self.db.get_user_by_id(ctx.user_id)?;
        Ok(row.map(|u| Identity {
            id: u.id,
            display_name: u.username,
            avatar: u.avatar,
        }))
    }
}

/// Persists accepted messages in the messages table.
pub struct DbMessageStore {
    db: Arc<Database>,
}

impl DbMessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl MessageStore for DbMessageStore {
    fn save(&self, message: &NewMessage) -> anyhow::Result<()> {
        self.db
            .insert_message(message.author_id, &message.inscription, &message.date_of_dispatch)
            .map(|_| ())
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use parlor_types::api::DispatchReceipt;

/// The acting identity resolved for a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub display_name: String,
    pub avatar: String,
}

/// Opaque reference to the caller. The HTTP layer builds it from verified
/// JWT claims; the pipeline only hands it through to the resolver.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: i64,
}

/// A message accepted by the pipeline. `date_of_dispatch` is stamped here,
/// never taken from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub author_id: i64,
    pub inscription: String,
    pub date_of_dispatch: DateTime<Utc>,
}

/// Resolves the caller to an identity. `Ok(None)` is the normal outcome for
/// an unknown caller; `Err` is reserved for infrastructure failure and
/// surfaces as a store-class error, never as an authorization rejection.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, ctx: &CallerContext) -> anyhow::Result<Option<Identity>>;
}

/// Persists accepted messages. Failures surface as-is; the pipeline does
/// not retry.
pub trait MessageStore: Send + Sync {
    fn save(&self, message: &NewMessage) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("message content is empty")]
    EmptyContent,
    #[error("could not determine the posting user")]
    UnresolvedIdentity,
    #[error("message store failure: {0}")]
    Store(#[from] anyhow::Error),
}

/// User-facing rejection strings. Deployments localize these through the
/// server config; the literals here are only defaults.
#[derive(Debug, Clone)]
pub struct RejectionMessages {
    pub empty_content: String,
    pub unresolved_identity: String,
}

impl Default for RejectionMessages {
    fn default() -> Self {
        Self {
            empty_content: "The message cannot be empty.".into(),
            unresolved_identity: "Could not determine the posting user.".into(),
        }
    }
}

/// The message submission pipeline. Stateless; safe to share across
/// concurrent requests as long as the collaborators are.
pub struct Submitter {
    resolver: Arc<dyn IdentityResolver>,
    store: Arc<dyn MessageStore>,
}

impl Submitter {
    pub fn new(resolver: Arc<dyn IdentityResolver>, store: Arc<dyn MessageStore>) -> Self {
        Self { resolver, store }
    }

    /// Validates, resolves, persists — strictly in that order. Content is
    /// checked before the resolver is consulted; the store is reached only
    /// with a resolved identity. A message is persisted if and only if a
    /// receipt is returned.
    pub fn submit(
        &self,
        inscription: &str,
        ctx: &CallerContext,
    ) -> Result<DispatchReceipt, SubmissionError> {
        // Whitespace-only counts as empty; the stored inscription keeps the
        // caller's text untouched.
        if inscription.trim().is_empty() {
            return Err(SubmissionError::EmptyContent);
        }

        let identity = self
            .resolver
            .resolve(ctx)?
            .ok_or(SubmissionError::UnresolvedIdentity)?;

        let message = NewMessage {
            author_id: identity.id,
            inscription: inscription.to_string(),
            date_of_dispatch: Utc::now(),
        };
        self.store.save(&message)?;

        debug!(author_id = identity.id, "message accepted");

        Ok(DispatchReceipt {
            avatar: identity.avatar,
            date_of_dispatch: format_dispatch(&message.date_of_dispatch),
            user_name: identity.display_name,
            userid: identity.id,
            inscription: message.inscription,
        })
    }
}

/// `dd.MM.yyyy HH:mm:ss`, zero-padded, 24-hour clock. Clients parse this
/// string verbatim.
pub fn format_dispatch(at: &DateTime<Utc>) -> String {
    at.format("%d.%m.%Y %H:%M:%S").to_string()
}

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, warn};

use parlor_types::api::{ErrorBody, MessageView, SendMessageRequest};

use crate::auth::AppState;
use crate::middleware::Claims;
use crate::submit::{CallerContext, SubmissionError, format_dispatch};

/// Hard cap on inscription length, enforced at the HTTP boundary.
/// The pipeline itself only owns the non-emptiness check.
pub const MAX_INSCRIPTION_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    if req.inscription.chars().count() > MAX_INSCRIPTION_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "Message is too long.".into(),
            }),
        )
            .into_response();
    }

    let ctx = CallerContext { user_id: claims.sub };

    // Run the pipeline off the async runtime; both collaborators sit on
    // blocking sqlite.
    let submit_state = state.clone();
    let joined = tokio::task::spawn_blocking(move || {
        submit_state.submitter.submit(&req.inscription, &ctx)
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match result {
        // Plain 200: existing clients treat the receipt body itself as the
        // confirmation.
        Ok(receipt) => Json(receipt).into_response(),
        Err(SubmissionError::EmptyContent) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: state.rejections.empty_content.clone(),
            }),
        )
            .into_response(),
        Err(SubmissionError::UnresolvedIdentity) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: state.rejections.unresolved_identity.clone(),
            }),
        )
            .into_response(),
        Err(SubmissionError::Store(e)) => {
            error!("message store failure: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Internal server error.".into(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let limit = query.limit.min(200);

    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.get_recent_messages(limit))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("message query failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let messages: Vec<MessageView> = rows
        .into_iter()
        .map(|row| {
            let date_of_dispatch = row
                .date_of_dispatch
                .parse::<chrono::DateTime<chrono::Utc>>()
                .map(|at| format_dispatch(&at))
                .unwrap_or_else(|e| {
                    warn!("Corrupt date_of_dispatch '{}' on message {}: {}", row.date_of_dispatch, row.id, e);
                    row.date_of_dispatch.clone()
                });

            MessageView {
                id: row.id,
                author_id: row.author_id,
                author_username: row.author_username,
                author_avatar: row.author_avatar,
                inscription: row.inscription,
                date_of_dispatch,
            }
        })
        .collect();

    Ok(Json(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AppStateInner;
    use crate::store::{DbIdentityResolver, DbMessageStore};
    use crate::submit::{RejectionMessages, Submitter};
    use axum::body::to_bytes;
    use parlor_db::Database;
    use std::sync::Arc;

    fn test_state() -> (AppState, i64) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let user_id = db.create_user("testUser", "hash", "avatar.png").unwrap();

        let submitter = Submitter::new(
            Arc::new(DbIdentityResolver::new(db.clone())),
            Arc::new(DbMessageStore::new(db.clone())),
        );

        let state = Arc::new(AppStateInner {
            db,
            jwt_secret: "unit-secret".into(),
            submitter,
            rejections: RejectionMessages::default(),
        });
        (state, user_id)
    }

    fn claims_for(user_id: i64) -> Claims {
        Claims {
            sub: user_id,
            username: "testUser".into(),
            exp: 0,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post(state: AppState, user_id: i64, inscription: &str) -> Response {
        create_message(
            State(state),
            Extension(claims_for(user_id)),
            Json(SendMessageRequest {
                inscription: inscription.into(),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn valid_submission_answers_200_with_receipt() {
        let (state, user_id) = test_state();
        let response = post(state, user_id, "Valid message").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["inscription"], "Valid message");
        assert_eq!(json["userName"], "testUser");
        assert_eq!(json["avatar"], "avatar.png");
        assert_eq!(json["userid"], user_id);
    }

    #[tokio::test]
    async fn empty_submission_answers_400_with_error_body() {
        let (state, user_id) = test_state();
        let response = post(state, user_id, "").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], RejectionMessages::default().empty_content);
    }

    #[tokio::test]
    async fn unknown_caller_answers_401_with_error_body() {
        let (state, _) = test_state();
        let response = post(state, 999, "Valid message").await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], RejectionMessages::default().unresolved_identity);
    }

    #[tokio::test]
    async fn store_failure_answers_500_with_error_body() {
        let (state, user_id) = test_state();
        state
            .db
            .with_conn(|conn| {
                conn.execute_batch("DROP TABLE messages")?;
                Ok(())
            })
            .unwrap();

        let response = post(state, user_id, "Valid message").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }
}

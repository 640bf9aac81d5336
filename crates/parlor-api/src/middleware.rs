use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::auth::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

/// Startup-time secret lookup. The running server reads the key from state;
/// this helper is only for building that state from the environment.
pub fn jwt_secret() -> String {
    std::env::var("PARLOR_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into())
}

/// Extract and validate JWT from Authorization header, keyed by the signing
/// secret held in state. The verified claims become the caller context for
/// the submission pipeline downstream.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AppStateInner;
    use crate::store::{DbIdentityResolver, DbMessageStore};
    use crate::submit::{RejectionMessages, Submitter};
    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use parlor_db::Database;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(secret: &str) -> AppState {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let submitter = Submitter::new(
            Arc::new(DbIdentityResolver::new(db.clone())),
            Arc::new(DbMessageStore::new(db.clone())),
        );
        Arc::new(AppStateInner {
            db,
            jwt_secret: secret.into(),
            submitter,
            rejections: RejectionMessages::default(),
        })
    }

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state, require_auth))
    }

    fn token_signed_with(secret: &[u8]) -> String {
        let claims = Claims {
            sub: 1,
            username: "testUser".into(),
            exp: (jsonwebtoken::get_current_timestamp() + 3600) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = protected_app(test_state("state-secret"));
        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_state_secret_passes() {
        let app = protected_app(test_state("state-secret"));
        let token = token_signed_with(b"state-secret");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_rejected() {
        let app = protected_app(test_state("state-secret"));
        let token = token_signed_with(b"some-other-secret");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parlor_api::auth::{self, AppState, AppStateInner};
use parlor_api::messages;
use parlor_api::middleware::{jwt_secret, require_auth};
use parlor_api::store::{DbIdentityResolver, DbMessageStore};
use parlor_api::submit::{RejectionMessages, Submitter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = jwt_secret();
    let db_path = std::env::var("PARLOR_DB_PATH").unwrap_or_else(|_| "parlor.db".into());
    let host = std::env::var("PARLOR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PARLOR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Rejection strings are deployment-localizable
    let mut rejections = RejectionMessages::default();
    if let Ok(s) = std::env::var("PARLOR_ERR_EMPTY") {
        rejections.empty_content = s;
    }
    if let Ok(s) = std::env::var("PARLOR_ERR_NO_USER") {
        rejections.unresolved_identity = s;
    }

    // Init database
    let db = Arc::new(parlor_db::Database::open(&PathBuf::from(&db_path))?);

    // The submission pipeline with DB-backed collaborators
    let submitter = Submitter::new(
        Arc::new(DbIdentityResolver::new(db.clone())),
        Arc::new(DbMessageStore::new(db.clone())),
    );

    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        submitter,
        rejections,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/messages", get(messages::get_messages))
        .route("/messages", post(messages::create_message))
        .layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parlor server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

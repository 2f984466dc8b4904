use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use reunite_api::auth::{self, AppState, AppStateInner};
use reunite_api::middleware::require_auth;
use reunite_api::{chat, claims, items, messages, rewards, schools};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reunite=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("REUNITE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("REUNITE_DB_PATH").unwrap_or_else(|_| "reunite.db".into());
    let host = std::env::var("REUNITE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REUNITE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let ollama_host =
        std::env::var("REUNITE_OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".into());
    let ollama_model = std::env::var("REUNITE_OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".into());

    // Init database
    let db = reunite_db::Database::open(&PathBuf::from(&db_path))?;
    ensure_default_admin(&db)?;

    // One AI connection for the whole process, injected through state.
    let ai = reunite_ai::AiClient::new(ollama_host, ollama_model)?;

    let state: AppState = Arc::new(AppStateInner { db, jwt_secret, ai });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/items/lost", post(items::report_lost_item))
        .route("/items/lost", get(items::list_lost_items))
        .route("/items/lost/{item_id}", delete(items::delete_lost_item))
        .route("/items/found", post(items::report_found_item))
        .route("/items/found", get(items::list_found_items))
        .route("/items/found/{item_id}", delete(items::delete_found_item))
        .route("/items/matches", get(items::get_matches))
        .route("/claims", post(claims::create_claim))
        .route("/claims/mine", get(claims::my_claims))
        .route("/claims/incoming", get(claims::incoming_claims))
        .route("/claims/{claim_id}/verify", post(claims::verify_claim))
        .route("/claims/{claim_id}/approve", post(claims::approve_claim))
        .route("/claims/{claim_id}/reject", post(claims::reject_claim))
        .route("/claims/{claim_id}/messages", get(messages::get_messages))
        .route("/messages", post(messages::send_message))
        .route("/rewards/points", get(rewards::my_points))
        .route("/rewards/leaderboard", get(rewards::leaderboard))
        .route("/schools", post(schools::create_school))
        .route("/schools", get(schools::list_schools))
        .route("/schools/join", post(schools::join_school))
        .route("/schools/mine", get(schools::my_school))
        .route("/schools/leave", post(schools::leave_school))
        .route("/schools/{school_id}", get(schools::get_school))
        .route("/schools/{school_id}", delete(schools::deactivate_school))
        .route(
            "/schools/{school_id}/join-code",
            post(schools::regenerate_join_code),
        )
        .route("/chat", post(chat::send_chat_message))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Reunite server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed the default admin account on first start so school management is
/// reachable before any other user exists.
fn ensure_default_admin(db: &reunite_db::Database) -> anyhow::Result<()> {
    let email =
        std::env::var("REUNITE_ADMIN_EMAIL").unwrap_or_else(|_| "admin@reunite.com".into());
    if db.get_user_by_email(&email)?.is_some() {
        return Ok(());
    }

    let password = std::env::var("REUNITE_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let password_hash = auth::hash_password(&password)?;
    db.create_user(
        &Uuid::new_v4().to_string(),
        &email,
        &password_hash,
        "Admin",
        "User",
        "admin",
        None,
    )?;
    warn!("Default admin created: {} — change the password", email);
    Ok(())
}

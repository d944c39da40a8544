//! Chat-room backend.
//!
//! Participants register a name, post broadcast or private messages and keep
//! themselves alive with heartbeats. A background sweeper removes anyone whose
//! heartbeat goes quiet and announces the departure to the room.

pub mod appresult;
pub mod config;
pub mod db;
pub mod health;
pub mod identity;
pub mod messages;
pub mod participants;
pub mod sweeper;
pub mod validate;

pub use appresult::{AppError, AppResult};

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(participants::router())
        .merge(messages::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

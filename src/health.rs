use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Pings the database. Always answers 200 so probes can read the body.
#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.health.check")]
pub async fn health_check(State(db_pool): State<SqlitePool>) -> Json<HealthResponse> {
    let healthy = sqlx::query("SELECT 1").fetch_one(&db_pool).await.is_ok();
    let status = if healthy { "healthy" } else { "unhealthy" };

    Json(HealthResponse { status, database: status })
}

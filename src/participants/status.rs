use axum::{debug_handler, extract::State, http::StatusCode};
use sqlx::SqlitePool;
use tracing::{instrument, Span};

use crate::{db, identity::Identity, AppError, AppResult};

/// Heartbeat: keeps the caller off the sweeper's list.
///
/// A request that names nobody is answered like one naming a stranger: 404.
#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.participants.heartbeat", fields(participant))]
pub(crate) async fn heartbeat(
    identity: Result<Identity, AppError>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<StatusCode> {
    let Ok(Identity(user)) = identity else {
        return Err(AppError::NotFound("No participant named in the request".to_owned()));
    };
    Span::current().record("participant", user.as_str());

    let refreshed = sqlx::query("UPDATE participants SET last_status=? WHERE name=?")
        .bind(db::now_millis())
        .bind(&user)
        .execute(&db_pool)
        .await?
        .rows_affected();

    if refreshed == 0 {
        return Err(AppError::NotFound(format!("Participant {user} is not registered")));
    }
    Ok(StatusCode::OK)
}

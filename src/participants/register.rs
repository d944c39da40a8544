use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{
    db::{self, MessageKind, BROADCAST, ENTERED_TEXT},
    validate::{require_object, GetField},
    AppError, AppResult,
};

fn already_registered() -> AppError {
    AppError::Conflict("Participant already registered".to_owned())
}

/// Registers a participant and announces the arrival to the room.
///
/// The existence check answers the common case; the primary key on `name`
/// settles two registrations racing for the same name.
#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.participants.register")]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = payload.map_err(|e| AppError::invalid(e.body_text()))?;
    require_object(&body)?;

    let mut errors = vec![];
    let name = body
        .text_field("name", &mut errors)
        .ok_or_else(|| AppError::Validation(errors))?;

    if db::participant_exists(&db_pool, &name).await? {
        return Err(already_registered());
    }

    let mut tx = db_pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO participants (name,last_status) VALUES (?,?)")
        .bind(&name)
        .bind(db::now_millis())
        .execute(&mut *tx)
        .await;
    match inserted {
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(already_registered());
        }
        other => {
            other?;
        }
    }

    db::insert_message(&mut *tx, &name, BROADCAST, ENTERED_TEXT, MessageKind::Status).await?;
    tx.commit().await?;

    info!(target: "chat.participants", participant = %name, "Participant joined");
    Ok(StatusCode::CREATED)
}

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{identity::Identity, AppResult};

use super::owned_message;

#[debug_handler(state = crate::AppState)]
#[instrument(
    skip_all,
    name = "chat.messages.delete",
    fields(participant = %user, message_id = %id)
)]
pub(crate) async fn delete_message(
    Identity(user): Identity,
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<StatusCode> {
    owned_message(&db_pool, &id, &user).await?;

    sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(&id)
        .execute(&db_pool)
        .await?;

    info!(target: "chat.messages", "Message deleted");
    Ok(StatusCode::NO_CONTENT)
}

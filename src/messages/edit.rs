use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{db::Message, identity::Identity, AppResult};

use super::{owned_message, require_registered, MessageDraft};

/// Rewrites the recipient, text and kind of one of the caller's messages.
/// The original timestamp is kept.
#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.messages.edit", fields(participant = %user, message_id = %id))]
pub(crate) async fn edit_message(
    Identity(user): Identity,
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Message>> {
    let MessageDraft { to, text, kind } = MessageDraft::from_payload(payload)?;
    require_registered(&db_pool, &user).await?;
    let mut message = owned_message(&db_pool, &id, &user).await?;

    sqlx::query("UPDATE messages SET to_name=?,text=?,kind=? WHERE id=?")
        .bind(&to)
        .bind(&text)
        .bind(kind.as_str())
        .bind(&id)
        .execute(&db_pool)
        .await?;

    info!(target: "chat.messages", "Message edited");

    message.to = to;
    message.text = text;
    message.kind = kind;
    Ok(Json(message))
}

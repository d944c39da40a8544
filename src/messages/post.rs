use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{db, identity::Identity, AppResult};

use super::{require_registered, MessageDraft};

#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.messages.post", fields(participant = %user))]
pub(crate) async fn post_message(
    Identity(user): Identity,
    State(db_pool): State<SqlitePool>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<StatusCode> {
    let MessageDraft { to, text, kind } = MessageDraft::from_payload(payload)?;
    require_registered(&db_pool, &user).await?;

    let id = db::insert_message(&db_pool, &user, &to, &text, kind).await?;

    info!(
        target: "chat.messages",
        message_id = %id,
        to = %to,
        kind = kind.as_str(),
        "Message posted"
    );
    Ok(StatusCode::CREATED)
}

use std::num::IntErrorKind;

use axum::{
    debug_handler,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    db::{Message, BROADCAST},
    identity::Identity,
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ListMessagesQuery {
    limit: Option<String>,
}

/// `None` for no limit; an empty `limit=` counts as absent. A positive limit
/// too large for `i64` is capped, since it asks for everything anyway.
fn parse_limit(raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if limit > 0 => Ok(Some(limit)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            _ => Err(AppError::invalid("\"limit\" must be a positive integer")),
        },
    }
}

/// Everything the caller may see, oldest first: broadcasts, public messages,
/// and private messages they sent or received. With `limit`, only the newest
/// `limit` of those, still oldest first.
#[debug_handler(state = crate::AppState)]
#[instrument(skip_all, name = "chat.messages.list", fields(participant = %user))]
pub(crate) async fn list_messages(
    Identity(user): Identity,
    Query(ListMessagesQuery { limit }): Query<ListMessagesQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<Message>>> {
    let limit = parse_limit(limit.as_deref())?;

    // LIMIT -1 is unbounded in SQLite
    let messages = sqlx::query_as(
        r#"SELECT id,from_name,to_name,text,kind,time FROM (
            SELECT seq,id,from_name,to_name,text,kind,time FROM messages
            WHERE to_name=?1 OR to_name=?2 OR from_name=?2 OR kind='message'
            ORDER BY seq DESC LIMIT ?3
        ) ORDER BY seq"#,
    )
    .bind(BROADCAST)
    .bind(&user)
    .bind(limit.unwrap_or(-1))
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(messages))
}

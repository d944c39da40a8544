mod delete;
mod edit;
mod list;
mod post;

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{self, Message, MessageKind},
    validate::{require_object, GetField},
    AppError, AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list::list_messages).post(post::post_message))
        .route("/messages/{id}", put(edit::edit_message).delete(delete::delete_message))
}

/// The client-supplied part of a message, checked and tag-stripped.
#[derive(Debug)]
pub(crate) struct MessageDraft {
    pub(crate) to: String,
    pub(crate) text: String,
    pub(crate) kind: MessageKind,
}

impl MessageDraft {
    pub(crate) fn from_payload(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Self> {
        let Json(body) = payload.map_err(|e| AppError::invalid(e.body_text()))?;
        require_object(&body)?;

        let mut errors = vec![];
        let to = body.text_field("to", &mut errors);
        let text = body.text_field("text", &mut errors);
        let kind = body
            .choice_field("type", &MessageKind::POSTABLE, &mut errors)
            .and_then(|kind| kind.parse::<MessageKind>().ok());

        match (to, text, kind) {
            (Some(to), Some(text), Some(kind)) => Ok(MessageDraft { to, text, kind }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Only registered participants may write to the room.
pub(crate) async fn require_registered(db_pool: &SqlitePool, user: &str) -> AppResult<()> {
    if db::participant_exists(db_pool, user).await? {
        Ok(())
    } else {
        Err(AppError::invalid(format!("Participant {user} is not registered")))
    }
}

/// Looks up a message the caller is allowed to change.
pub(crate) async fn owned_message(
    db_pool: &SqlitePool,
    id: &str,
    user: &str,
) -> AppResult<Message> {
    let Some(message) = db::find_message(db_pool, id).await? else {
        return Err(AppError::NotFound(format!("Message {id} does not exist")));
    };

    if message.from != user {
        return Err(AppError::Unauthorized(format!("Message {id} belongs to someone else")));
    }
    Ok(message)
}

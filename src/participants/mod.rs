mod list;
mod register;
mod status;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list::list_participants).post(register::register))
        .route("/status", post(status::heartbeat))
}

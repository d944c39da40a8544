use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{validate::strip_tags, AppError};

pub const USER_HEADER: &str = "user";

/// The acting participant, named by the `user` request header.
///
/// Names may carry non-ASCII characters, so the raw header bytes are read
/// as UTF-8 rather than through `HeaderValue::to_str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_HEADER) else {
            return Err(AppError::invalid("\"user\" header is required"));
        };

        let raw = std::str::from_utf8(value.as_bytes())
            .map_err(|_| AppError::invalid("\"user\" header must be valid UTF-8"))?;

        let name = strip_tags(raw);
        if name.is_empty() {
            return Err(AppError::invalid("\"user\" header is not allowed to be empty"));
        }

        Ok(Identity(name))
    }
}

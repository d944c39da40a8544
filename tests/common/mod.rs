//! Drives the real router in-process, one request at a time.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use chatroom::{identity::USER_HEADER, router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

#[derive(Clone)]
pub struct TestApp {
    router: Router,
    pub db_pool: SqlitePool,
}

impl TestApp {
    pub fn new(db_pool: SqlitePool) -> Self {
        let router = router(AppState { db_pool: db_pool.clone() });
        Self { router, db_pool }
    }

    /// Sends a request and returns the status with the body parsed as JSON
    /// (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let raw = body.map(|body| body.to_string());
        self.request_raw(method, uri, user, raw.as_deref()).await
    }

    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            let value = HeaderValue::from_bytes(user.as_bytes()).unwrap();
            builder = builder.header(USER_HEADER, value);
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_owned())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn register(&self, name: &str) {
        let (status, _) = self
            .request(Method::POST, "/participants", None, Some(serde_json::json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "registering {name}");
    }

    pub async fn post(&self, user: &str, to: &str, text: &str, kind: &str) -> StatusCode {
        let body = serde_json::json!({ "to": to, "text": text, "type": kind });
        self.request(Method::POST, "/messages", Some(user), Some(body)).await.0
    }

    /// Messages visible to `user`, as returned by `GET /messages`.
    pub async fn messages(&self, user: &str) -> Vec<Value> {
        let (status, body) = self.request(Method::GET, "/messages", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().cloned().unwrap()
    }

    /// Id of the first message visible to `user` carrying `text`.
    pub async fn message_id(&self, user: &str, text: &str) -> String {
        self.messages(user)
            .await
            .into_iter()
            .find(|m| m["text"] == text)
            .and_then(|m| m["id"].as_str().map(str::to_owned))
            .unwrap()
    }
}

pub fn texts(messages: &[Value]) -> Vec<&str> {
    messages.iter().filter_map(|m| m["text"].as_str()).collect()
}

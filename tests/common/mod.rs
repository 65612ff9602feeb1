//! Shared helpers: an in-memory [`UserStore`] and a router wired to it.

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
    response::Response,
};
use quizgate::{
    api::{AppState, router},
    auth::AuthConfig,
    gate::GateConfig,
    quiz::Catalog,
    store::{SessionRecord, StoreError, User, UserStore},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: HashMap<Vec<u8>, (Uuid, Instant)>,
}

/// Behaves like the `PostgreSQL` store, including the unique email constraint.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub async fn user(&self, email: &str) -> Option<User> {
        let tables = self.tables.lock().await;
        tables.users.iter().find(|u| u.email == email).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }
}

impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.user(email).await)
    }

    async fn create_user(&self, email: &str, password: Option<String>) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn set_password(&self, user_id: Uuid, password: String) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::Internal)?;
        user.password = Some(password);
        Ok(())
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: Vec<u8>,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let ttl = Duration::from_secs(u64::try_from(ttl_seconds).unwrap_or(0));
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sessions.retain(|_, (_, expires_at)| *expires_at > now);
        tables.sessions.insert(token_hash, (user_id, now + ttl));
        Ok(())
    }

    async fn find_session(&self, token_hash: Vec<u8>) -> Result<Option<SessionRecord>, StoreError> {
        let tables = self.tables.lock().await;
        let Some((user_id, expires_at)) = tables.sessions.get(&token_hash).copied() else {
            return Ok(None);
        };
        if expires_at <= Instant::now() {
            return Ok(None);
        }
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| SessionRecord {
                user_id: u.id,
                email: u.email.clone(),
            }))
    }

    async fn delete_session(&self, token_hash: Vec<u8>) -> Result<(), StoreError> {
        self.tables.lock().await.sessions.remove(&token_hash);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Every call fails, as if the database were unreachable.
#[derive(Clone, Default)]
pub struct DownStore;

impl UserStore for DownStore {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Internal)
    }

    async fn create_user(&self, _email: &str, _password: Option<String>) -> Result<User, StoreError> {
        Err(StoreError::Internal)
    }

    async fn set_password(&self, _user_id: Uuid, _password: String) -> Result<(), StoreError> {
        Err(StoreError::Internal)
    }

    async fn create_session(
        &self,
        _user_id: Uuid,
        _token_hash: Vec<u8>,
        _ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        Err(StoreError::Internal)
    }

    async fn find_session(&self, _token_hash: Vec<u8>) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Internal)
    }

    async fn delete_session(&self, _token_hash: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Internal)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Internal)
    }
}

pub const BASE_URL: &str = "http://localhost:8080";

pub fn test_catalog() -> Result<Catalog> {
    Catalog::from_json(
        r#"[
            {"id": "q1", "title": "Do you trade?", "options": [
                {"id": "yes", "text": "Yes", "next": "q2"},
                {"id": "no", "text": "No", "next": "q3"}
            ]},
            {"id": "q2", "title": "How long?", "options": [
                {"id": "short", "text": "Under a year", "next": "q4"},
                {"id": "long", "text": "Years", "next": "q4"}
            ]},
            {"id": "q3", "title": "Want to learn?", "options": [
                {"id": "maybe", "text": "Maybe", "next": "q4"},
                {"id": "never", "text": "Never", "next": null}
            ]},
            {"id": "q4", "title": "Budget?", "options": [
                {"id": "low", "text": "Low", "next": null}
            ]}
        ]"#,
    )
    .context("test catalog is invalid")
}

pub fn app<S: UserStore + 'static>(store: S) -> Result<Router> {
    let state = AppState::new(
        store,
        test_catalog()?,
        AuthConfig::new(BASE_URL.to_string()),
        GateConfig::default(),
    );
    Ok(router(state))
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<Response> {
    app.clone().oneshot(request).await.context("router failed")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).context("bad request")
}

pub fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(body)?))
        .context("bad request")
}

pub async fn json_body(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&bytes).context("body is not JSON")
}

pub async fn text_body(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    String::from_utf8(bytes.to_vec()).context("body is not UTF-8")
}

pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
}

/// `name=value` part of the `Set-Cookie` header, ready to send back.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

/// Register `email`/`password` and sign in, returning the cookie to send back.
pub async fn signed_in(app: &Router, email: &str, password: &str) -> Result<String> {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = send(app, post_json("/auth/register", &body, None)?).await?;
    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "register failed: {}",
        response.status()
    );

    let response = send(app, post_json("/auth/signin", &body, None)?).await?;
    anyhow::ensure!(
        response.status() == StatusCode::OK,
        "sign-in failed: {}",
        response.status()
    );
    session_cookie(response.headers()).context("no session cookie")
}

//! Credential sign-in, progressive registration and session endpoints.

use crate::{
    api::AppState,
    auth::{
        self, AuthError, Credentials, RegisterOutcome, Session, on_sign_in, redirect_target,
        session::{clear_session_cookie, issue_session, resolve_session, revoke_session, session_cookie},
    },
    store::UserStore,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
    /// Where the browser wanted to go; absolute or site-relative.
    callback_url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignInResponse {
    pub user_id: Uuid,
    pub redirect: String,
}

#[derive(ToSchema, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path= "/auth/signin",
    request_body = SignInRequest,
    responses (
        (status = 200, description = "Signed in; session cookie set", body = SignInResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag= "auth"
)]
#[instrument(skip(state, payload))]
pub async fn sign_in<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Option<Json<SignInRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let credentials = Credentials::new(&request.email, SecretString::from(request.password));
    let user = match auth::authorize(state.store.as_ref(), credentials).await {
        Ok(user) => user,
        Err(AuthError::Denied) => {
            return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
        }
        Err(AuthError::Internal) => return internal_error(),
    };

    if on_sign_in(state.store.as_ref(), &user.email).await.is_err() {
        return internal_error();
    }

    let token = match issue_session(state.store.as_ref(), &state.auth, user.id).await {
        Ok(token) => token,
        Err(_) => return internal_error(),
    };

    let cookie = match session_cookie(&state.auth, &token) {
        Ok(cookie) => cookie,
        Err(e) => {
            error!("Failed to build session cookie: {e}");
            return internal_error();
        }
    };

    let base_url = state.auth.base_url();
    let callback_url = request.callback_url.as_deref().unwrap_or(base_url);
    let redirect = redirect_target(callback_url, base_url, state.auth.landing_path());

    info!(user_id = %user.id, "Signed in");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    (
        StatusCode::OK,
        headers,
        Json(SignInResponse {
            user_id: user.id,
            redirect,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path= "/auth/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Password set for a new user or a captured lead"),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "User with the specified email already has a password"),
    ),
    tag= "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let outcome = auth::register(
        state.store.as_ref(),
        &request.email,
        SecretString::from(request.password),
    )
    .await;

    match outcome {
        Ok(RegisterOutcome::Created) => (StatusCode::CREATED, "User created".to_string()),
        Ok(RegisterOutcome::Upgraded) => (StatusCode::CREATED, "Password set".to_string()),
        Ok(RegisterOutcome::Conflict) => (StatusCode::CONFLICT, "User already exists".to_string()),
        Ok(RegisterOutcome::InvalidEmail) => (StatusCode::BAD_REQUEST, "Invalid email".to_string()),
        Ok(RegisterOutcome::WeakPassword) => (
            StatusCode::BAD_REQUEST,
            format!(
                "Password must be at least {} characters",
                auth::sign_in::MIN_PASSWORD_LENGTH
            ),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
    .into_response()
}

#[utoipa::path(
    post,
    path= "/auth/signout",
    responses (
        (status = 204, description = "Session revoked and cookie cleared"),
    ),
    tag= "auth"
)]
pub async fn sign_out<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    if revoke_session(state.store.as_ref(), &headers).await.is_err() {
        return internal_error();
    }

    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(&state.auth) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to build session cookie: {e}"),
    }

    (StatusCode::NO_CONTENT, response_headers).into_response()
}

#[utoipa::path(
    get,
    path= "/auth/session",
    responses (
        (status = 200, description = "Current session", body = Session),
        (status = 204, description = "No session"),
    ),
    tag= "auth"
)]
pub async fn session<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    match resolve_session(state.store.as_ref(), &headers).await {
        Ok(Some(session)) => Json::<Session>(session).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(_) => internal_error(),
    }
}

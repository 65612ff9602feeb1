use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

/// The sign-in page, described for a client-rendered front end.
#[derive(ToSchema, Serialize, Debug)]
pub struct SignInPage {
    name: String,
    version: String,
    sign_in: String,
    register: String,
    quiz: String,
}

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Sign-in page", body = SignInPage),
    ),
    tag= "quizgate"
)]
pub async fn root() -> impl IntoResponse {
    Json(SignInPage {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sign_in: "/auth/signin".to_string(),
        register: "/auth/register".to_string(),
        quiz: "/quiz".to_string(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found".to_string())
}

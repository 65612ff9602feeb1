use crate::auth::Session;
use axum::{Extension, Json};

#[utoipa::path(
    get,
    path= "/dashboard",
    responses (
        (status = 200, description = "Signed-in user", body = Session),
        (status = 303, description = "No session, redirected to sign-in"),
    ),
    tag= "dashboard"
)]
// only reachable with a session, the access middleware put it in the extensions
pub async fn dashboard(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

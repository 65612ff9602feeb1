use super::AppState;
use crate::{auth::session::resolve_session, gate::Access, store::UserStore};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

/// Resolve the session, run the access policy and either forward the request
/// (with the [`crate::auth::Session`] in its extensions) or redirect.
///
/// Open paths never touch the store, so the quiz keeps working when the
/// database does not.
pub async fn require_access<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Response {
    if state.gate.is_open(request.uri().path()) {
        return next.run(request).await;
    }

    let session = match resolve_session(state.store.as_ref(), request.headers()).await {
        Ok(session) => session,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response();
        }
    };

    let path = request.uri().path().to_string();
    match state.gate.decide(&path, session.is_some()) {
        Access::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        Access::Redirect(to) => {
            debug!(%path, %to, "Signed in, redirecting");
            Redirect::to(&to).into_response()
        }
        Access::Deny => {
            debug!(%path, "No session, redirecting to sign-in");
            Redirect::to(state.gate.sign_in_path()).into_response()
        }
    }
}

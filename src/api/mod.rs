use crate::{
    api::handlers::{auth, dashboard, health, quiz, root},
    auth::AuthConfig,
    gate::GateConfig,
    quiz::Catalog,
    store::{PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

mod access;
pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Everything a handler can reach. Cloned per request, so only `Arc`s inside.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub catalog: Arc<Catalog>,
    pub auth: Arc<AuthConfig>,
    pub gate: Arc<GateConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            auth: Arc::clone(&self.auth),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S> AppState<S> {
    #[must_use]
    pub fn new(store: S, catalog: Catalog, auth: AuthConfig, gate: GateConfig) -> Self {
        Self {
            store: Arc::new(store),
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
            gate: Arc::new(gate),
        }
    }
}

/// Build the application router.
///
/// `/`, `/health` and `/auth/*` are public. Quiz and dashboard routes, plus the
/// fallback, sit behind the access middleware.
pub fn router<S: UserStore + 'static>(state: AppState<S>) -> Router {
    let gated = Router::new()
        .route("/quiz", get(quiz::start::<S>))
        .route("/quiz/catalog", get(quiz::catalog::<S>))
        .route("/quiz/answer", post(quiz::answer::<S>))
        .route("/quiz/back", post(quiz::back::<S>))
        .route("/quiz/lead", post(quiz::lead::<S>))
        .route("/dashboard", get(dashboard::dashboard))
        .fallback(root::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::require_access::<S>,
        ));

    let public = Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health::<S>))
        .route("/auth/signin", post(auth::sign_in::<S>))
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/signout", post(auth::sign_out::<S>))
        .route("/auth/session", get(auth::session::<S>));

    public.merge(gated).with_state(state)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, auth_config: AuthConfig, catalog: Catalog) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = PgUserStore::new(pool);
    store
        .apply_schema()
        .await
        .context("Failed to apply database schema")?;

    info!(questions = catalog.len(), "Quiz catalog loaded");

    let state = AppState::new(store, catalog, auth_config, GateConfig::default());

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

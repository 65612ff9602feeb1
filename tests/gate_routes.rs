mod common;

use anyhow::{Context, Result, ensure};
use axum::http::StatusCode;
use common::{
    DownStore, MemoryStore, app, get, json_body, location, post_json, send, signed_in, text_body,
};

#[tokio::test]
async fn anonymous_visitor_can_take_the_quiz() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/quiz", None)?).await?;
    ensure!(response.status() == StatusCode::OK);

    let response = send(&app, get("/quiz/catalog", None)?).await?;
    ensure!(response.status() == StatusCode::OK);
    let body = json_body(response).await?;
    ensure!(body.as_array().map(Vec::len) == Some(4));
    Ok(())
}

#[tokio::test]
async fn anonymous_dashboard_redirects_to_sign_in() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/dashboard", None)?).await?;
    ensure!(response.status() == StatusCode::SEE_OTHER);
    ensure!(location(response.headers()) == Some("/"));
    Ok(())
}

#[tokio::test]
async fn anonymous_unknown_page_redirects_to_sign_in() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/pricing", None)?).await?;
    ensure!(response.status() == StatusCode::SEE_OTHER);
    ensure!(location(response.headers()) == Some("/"));
    Ok(())
}

#[tokio::test]
async fn public_routes_skip_the_gate() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/", None)?).await?;
    ensure!(response.status() == StatusCode::OK);
    let body = json_body(response).await?;
    ensure!(body["sign_in"] == "/auth/signin");

    let response = send(&app, get("/auth/session", None)?).await?;
    ensure!(response.status() == StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn health_reports_build_and_database() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/health", None)?).await?;
    ensure!(response.status() == StatusCode::OK);
    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|v| v.to_str().ok())
        .context("missing X-App header")?
        .to_string();
    ensure!(x_app.starts_with(&format!(
        "{}:{}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )));

    let body = json_body(response).await?;
    ensure!(body["database"] == "ok");
    ensure!(body["questions"] == 4);
    Ok(())
}

#[tokio::test]
async fn signed_in_user_reaches_dashboard() -> Result<()> {
    let app = app(MemoryStore::default())?;
    let cookie = signed_in(&app, "lead@example.com", "long enough").await?;

    let response = send(&app, get("/dashboard", Some(&cookie))?).await?;
    ensure!(response.status() == StatusCode::OK);
    let body = json_body(response).await?;
    ensure!(body["email"] == "lead@example.com");
    ensure!(body["user_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn signed_in_user_elsewhere_goes_to_dashboard() -> Result<()> {
    let app = app(MemoryStore::default())?;
    let cookie = signed_in(&app, "lead@example.com", "long enough").await?;

    let response = send(&app, get("/pricing", Some(&cookie))?).await?;
    ensure!(response.status() == StatusCode::SEE_OTHER);
    ensure!(location(response.headers()) == Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn signed_in_user_still_sees_the_quiz() -> Result<()> {
    let app = app(MemoryStore::default())?;
    let cookie = signed_in(&app, "lead@example.com", "long enough").await?;

    let response = send(&app, get("/quiz", Some(&cookie))?).await?;
    ensure!(response.status() == StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn allowed_but_unknown_dashboard_page_is_not_found() -> Result<()> {
    let app = app(MemoryStore::default())?;
    let cookie = signed_in(&app, "lead@example.com", "long enough").await?;

    let response = send(&app, get("/dashboard/settings", Some(&cookie))?).await?;
    ensure!(response.status() == StatusCode::NOT_FOUND);
    ensure!(text_body(response).await? == "Not found");
    Ok(())
}

#[tokio::test]
async fn forged_cookie_counts_as_anonymous() -> Result<()> {
    let app = app(MemoryStore::default())?;

    let response = send(&app, get("/dashboard", Some("quizgate_session=forged"))?).await?;
    ensure!(response.status() == StatusCode::SEE_OTHER);
    ensure!(location(response.headers()) == Some("/"));
    Ok(())
}

#[tokio::test]
async fn quiz_survives_a_store_outage() -> Result<()> {
    let app = app(DownStore)?;

    let response = send(&app, get("/quiz", Some("quizgate_session=stale"))?).await?;
    ensure!(response.status() == StatusCode::OK);

    let body = json_body(response).await?;
    let answer = serde_json::json!({ "state": body["state"], "option_id": "yes" });
    let response = send(&app, post_json("/quiz/answer", &answer, Some("quizgate_session=stale"))?).await?;
    ensure!(response.status() == StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn dashboard_fails_closed_on_a_store_outage() -> Result<()> {
    let app = app(DownStore)?;

    let response = send(&app, get("/dashboard", Some("quizgate_session=stale"))?).await?;
    ensure!(response.status() == StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

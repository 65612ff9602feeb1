//! # Quizgate (Lead Qualification Funnel)
//!
//! `quizgate` serves a branching questionnaire to anonymous visitors and puts a
//! credential gate in front of the signed-in area.
//!
//! ## Quiz
//!
//! The question catalog is loaded once at startup (built in, or a JSON file)
//! and validated: every `next` reference must name an existing question.
//! Navigation state lives with the client and is posted back on every step;
//! the server applies pure transitions and renders the next screen.
//!
//! ## Access
//!
//! - `/quiz*` is always open.
//! - `/dashboard*` needs a session.
//! - A signed-in user anywhere else is redirected to the dashboard.
//! - Everything else redirects to the sign-in page.
//!
//! ## Authentication
//!
//! Email + password, verified against an Argon2 hash. Every credential failure
//! is the same `401`. A successful sign-in provisions the user row if needed
//! and issues an opaque session token; only its SHA-256 hash is stored in
//! `PostgreSQL`. Emails captured by the funnel become password-less leads that
//! can later set a password through `/auth/register`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod gate;
pub mod quiz;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result, ensure};
    use std::fs;
    use std::path::PathBuf;

    // Normalize SQL to avoid brittle formatting checks in schema tests.
    fn canonicalize_sql(sql: &str) -> String {
        sql.chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_lowercase())
            .collect()
    }

    fn canonical_schema() -> Result<String> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sql/schema.sql");
        let sql = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read SQL file at {}", path.display()))?;
        Ok(canonicalize_sql(&sql))
    }

    #[test]
    fn schema_is_idempotent() -> Result<()> {
        let canonical = canonical_schema()?;
        ensure!(canonical.contains("createtableifnotexistsusers"));
        ensure!(canonical.contains("createtableifnotexistssessions"));
        ensure!(!canonical.contains("droptable"));
        Ok(())
    }

    #[test]
    fn email_is_unique_and_password_nullable() -> Result<()> {
        let canonical = canonical_schema()?;
        ensure!(
            canonical.contains("emailtextuniquenotnull") || canonical.contains("emailtextnotnullunique"),
            "users.email must be unique"
        );
        ensure!(
            !canonical.contains("passwordtextnotnull"),
            "users.password must stay nullable for leads"
        );
        Ok(())
    }

    #[test]
    fn sessions_store_hashes_only() -> Result<()> {
        let canonical = canonical_schema()?;
        ensure!(canonical.contains("token_hashbyteaprimarykey"));
        ensure!(canonical.contains("ondeletecascade"));
        Ok(())
    }
}

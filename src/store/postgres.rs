//! `PostgreSQL` implementation of [`UserStore`].

use anyhow::{Context, Result};
use sqlx::{Connection, PgPool, Row};
use tracing::{Instrument, Span, error};
use uuid::Uuid;

use super::{SessionRecord, StoreError, User, UserStore};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const PURGE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expires_at <= NOW()";

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create missing tables. Every statement is idempotent.
    ///
    /// # Errors
    /// Returns an error if a connection cannot be acquired or a statement fails.
    pub async fn apply_schema(&self) -> Result<()> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .context("failed to acquire connection for schema setup")?;

        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&mut *connection)
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        Ok(())
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Log the driver error and hand back an opaque one.
fn internal(context: &str, err: &sqlx::Error) -> StoreError {
    error!("{context}: {err}");
    StoreError::Internal
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

impl UserStore for PgUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, email, password FROM users WHERE email = $1";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|e| internal("failed to lookup user", &e))?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            password: row.get("password"),
        }))
    }

    async fn create_user(&self, email: &str, password: Option<String>) -> Result<User, StoreError> {
        let query = r"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING id, email, password
        ";
        let row = sqlx::query(query)
            .bind(email)
            .bind(password)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict
                } else {
                    internal("failed to insert user", &e)
                }
            })?;

        Ok(User {
            id: row.get("id"),
            email: row.get("email"),
            password: row.get("password"),
        })
    }

    async fn set_password(&self, user_id: Uuid, password: String) -> Result<(), StoreError> {
        let query = "UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1";
        sqlx::query(query)
            .bind(user_id)
            .bind(password)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(|e| internal("failed to update password", &e))?;

        Ok(())
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: Vec<u8>,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        // Expired rows are only filtered on read; drop them here so the table
        // does not grow without bound.
        sqlx::query(PURGE_EXPIRED_SESSIONS)
            .execute(&self.pool)
            .instrument(query_span("DELETE", PURGE_EXPIRED_SESSIONS))
            .await
            .map_err(|e| internal("failed to purge expired sessions", &e))?;

        let query = r"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        sqlx::query(query)
            .bind(token_hash)
            .bind(user_id)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|e| internal("failed to insert session", &e))?;

        Ok(())
    }

    async fn find_session(&self, token_hash: Vec<u8>) -> Result<Option<SessionRecord>, StoreError> {
        let query = r"
            SELECT s.user_id, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
        ";
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|e| internal("failed to lookup session", &e))?;

        Ok(row.map(|row| SessionRecord {
            user_id: row.get("user_id"),
            email: row.get("email"),
        }))
    }

    async fn delete_session(&self, token_hash: Vec<u8>) -> Result<(), StoreError> {
        let query = "DELETE FROM sessions WHERE token_hash = $1";
        sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|e| internal("failed to delete session", &e))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(|e| internal("failed to acquire database connection", &e))?;

        let ping_span = tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(|e| internal("failed to ping database", &e))
    }
}

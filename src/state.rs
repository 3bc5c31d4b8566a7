use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::config::AppConfig;

/// Embedded migrations; creates the users and products tables if absent.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    signing_key: Key,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let signing_key = derive_key(&config.session.secret);
        Self {
            db,
            config,
            signing_key,
        }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        MIGRATOR.run(&self.db).await.context("run migrations")?;
        Ok(())
    }

    /// State backed by an in-memory database, migrated and ready to use.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            session: crate::config::SessionConfig {
                secret: "test-secret".into(),
            },
        });
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        let state = Self::from_parts(db, config);
        state.migrate().await.expect("migrations");
        state
    }
}

/// Cookie jars pull their signing key straight out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.signing_key.clone()
    }
}

// Key::derive_from wants at least 64 bytes of material; the configured
// secret is repeated until it is long enough. An empty secret falls back
// to the dev default rather than looping.
fn derive_key(secret: &str) -> Key {
    let bytes = if secret.is_empty() {
        b"dev-secret-key".as_slice()
    } else {
        secret.as_bytes()
    };
    let mut material = Vec::with_capacity(64 + bytes.len());
    while material.len() < 64 {
        material.extend_from_slice(bytes);
    }
    Key::derive_from(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_still_derive_a_key() {
        // Must not panic even for a one-byte secret.
        let _ = derive_key("x");
    }

    #[test]
    fn same_secret_derives_same_key() {
        assert_eq!(
            derive_key("dev-secret-key").master(),
            derive_key("dev-secret-key").master()
        );
    }
}

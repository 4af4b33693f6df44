mod clients;
mod projects;
mod users;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::config::Config;
use crate::registry::{OwnedKey, Registries, StoreError};

pub use clients::PgClients;
pub use projects::PgProjects;
pub use users::PgUsers;

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let options =
            PgConnectOptions::from_str(config.database_url())?.database(&config.database_name);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create the tables if they are missing.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Registries sharing this pool.
    pub fn registries(&self) -> Registries {
        Registries {
            users: Arc::new(PgUsers::new(self.pool.clone())),
            clients: Arc::new(PgClients::new(self.pool.clone())),
            projects: Arc::new(PgProjects::new(self.pool.clone())),
        }
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config, run_migrations: bool) -> Result<Database> {
    let db = Database::new(config).await?;

    if run_migrations {
        db.migrate().await?;
        tracing::info!("database schema is up to date");
    }

    Ok(db)
}

/// Restricts a statement to one owned row. Every client and project
/// statement that touches an existing row goes through here.
pub(crate) fn push_owner_scope(query: &mut QueryBuilder<'_, Postgres>, key: OwnedKey) {
    query
        .push(" WHERE id = ")
        .push_bind(key.id)
        .push(" AND user_id = ")
        .push_bind(key.owner_id);
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in the term
/// taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Maps a unique-constraint violation on `field` to [`StoreError::Duplicate`].
pub(crate) fn unique_violation(err: sqlx::Error, field: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(field)
        }
        _ => StoreError::Database(err),
    }
}

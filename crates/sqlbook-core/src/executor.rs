//! Query execution against Postgres.

use crate::error::QueryError;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::TryStreamExt;
use sqlbook_types::{QueryOutcome, DEFAULT_DATABASE};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Either, Row, ValueRef};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Runs SQL text against a named database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql` in `database`. Only the first statement's rows are kept.
    async fn execute(&self, database: &str, sql: &str) -> Result<QueryOutcome, QueryError>;

    /// Names of the non-template databases on the server.
    async fn list_databases(&self) -> Result<Vec<String>, QueryError>;

    /// Release connections. Called once on process exit.
    async fn shutdown(&self) {}
}

/// Connection settings shared by every pool.
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    /// Database used for server-wide queries such as listing databases.
    pub default_database: String,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "admin".to_string(),
            password: "password".to_string(),
            max_connections: 5,
            default_database: DEFAULT_DATABASE.to_string(),
        }
    }
}

/// One lazily connected pool per database name.
pub struct PoolRegistry {
    settings: PostgresSettings,
    pools: DashMap<String, PgPool>,
}

impl PoolRegistry {
    pub fn new(settings: PostgresSettings) -> Self {
        Self {
            settings,
            pools: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &PostgresSettings {
        &self.settings
    }

    /// Pool for `database`, created on first use.
    pub fn pool(&self, database: &str) -> PgPool {
        if let Some(pool) = self.pools.get(database) {
            return pool.value().clone();
        }
        self.pools
            .entry(database.to_string())
            .or_insert_with(|| {
                info!(
                    target: "sqlbook::pool",
                    "Creating connection pool for database {}",
                    database
                );
                self.connect_lazy(database)
            })
            .value()
            .clone()
    }

    /// Databases that currently have a pool.
    pub fn databases(&self) -> Vec<String> {
        self.pools.iter().map(|p| p.key().clone()).collect()
    }

    /// Close every pool and forget them.
    pub async fn shutdown(&self) {
        let pools: Vec<(String, PgPool)> = self
            .pools
            .iter()
            .map(|p| (p.key().clone(), p.value().clone()))
            .collect();
        self.pools.clear();

        for (database, pool) in pools {
            pool.close().await;
            info!(target: "sqlbook::pool", "Closed connection pool for database {}", database);
        }
    }

    fn connect_lazy(&self, database: &str) -> PgPool {
        let options = PgConnectOptions::new()
            .host(&self.settings.host)
            .port(self.settings.port)
            .username(&self.settings.user)
            .password(&self.settings.password)
            .database(database);

        PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy_with(options)
    }
}

/// Executor backed by a [`PoolRegistry`].
pub struct PgExecutor {
    registry: Arc<PoolRegistry>,
}

impl PgExecutor {
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, database: &str, sql: &str) -> Result<QueryOutcome, QueryError> {
        let pool = self.registry.pool(database);
        debug!(target: "sqlbook::query", "Executing on {}: {}", database, sql);

        // Simple-query protocol: multiple statements allowed, values come back as text.
        let mut stream = sqlx::raw_sql(sql).fetch_many(&pool);
        let mut outcome = QueryOutcome::default();
        let mut statements = 0usize;

        while let Some(step) = stream.try_next().await? {
            match step {
                Either::Left(done) => {
                    if statements == 0 {
                        outcome.rows_affected = done.rows_affected();
                    }
                    statements += 1;
                }
                Either::Right(row) if statements == 0 => {
                    if outcome.columns.is_empty() {
                        outcome.columns = row
                            .columns()
                            .iter()
                            .map(|c| c.name().to_string())
                            .collect();
                    }
                    outcome.rows.push(row_values(&row));
                }
                Either::Right(_) => {}
            }
        }

        debug!(
            target: "sqlbook::query",
            "{} statement(s), {} row(s) kept",
            statements,
            outcome.rows.len()
        );
        Ok(outcome)
    }

    async fn list_databases(&self) -> Result<Vec<String>, QueryError> {
        let pool = self.registry.pool(&self.registry.settings().default_database);
        let names = sqlx::query_scalar::<_, String>(
            "SELECT datname FROM pg_database WHERE datistemplate = false ORDER BY datname",
        )
        .fetch_all(&pool)
        .await?;
        Ok(names)
    }

    async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}

fn row_values(row: &PgRow) -> Vec<Option<String>> {
    (0..row.len())
        .map(|i| {
            let value = row.try_get_raw(i).ok()?;
            if value.is_null() {
                return None;
            }
            let text = match value.as_str() {
                Ok(s) => s.to_string(),
                Err(_) => {
                    let bytes = value.as_bytes().unwrap_or_default();
                    String::from_utf8_lossy(bytes).into_owned()
                }
            };
            Some(text)
        })
        .collect()
}

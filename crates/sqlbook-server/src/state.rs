//! Shared application state.

use crate::config::Config;
use sqlbook_core::{
    FsBlobStore, PgExecutor, PoolRegistry, QueryExecutor, QueryRunner, TranscriptStore,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub store: Arc<TranscriptStore>,
    pub executor: Arc<dyn QueryExecutor>,
    pub runner: QueryRunner,
    pub config: Config,
}

impl AppState {
    /// File-backed transcripts and a Postgres executor, both from `config`.
    pub fn new(config: Config) -> sqlbook_core::Result<Self> {
        std::fs::create_dir_all(&config.conversations_dir)?;
        let blobs = Arc::new(FsBlobStore::new(config.conversations_dir.clone()));
        let store = Arc::new(TranscriptStore::new(blobs, config.store_config()));

        let registry = Arc::new(PoolRegistry::new(config.postgres_settings()));
        let executor: Arc<dyn QueryExecutor> = Arc::new(PgExecutor::new(registry));

        Ok(Self::with_parts(config, store, executor))
    }

    /// Assemble state from explicit parts.
    pub fn with_parts(
        config: Config,
        store: Arc<TranscriptStore>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        let runner = QueryRunner::new(store.clone(), executor.clone(), config.query_timeout());
        Self {
            store,
            executor,
            runner,
            config,
        }
    }

    /// Drain executor resources before exit.
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }
}

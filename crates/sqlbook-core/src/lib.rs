//! Transcript engine and query execution for sqlbook.

pub mod blob;
pub mod codec;
mod error;
pub mod executor;
pub mod format;
pub mod paginator;
pub mod parser;
mod relative_time;
pub mod runner;
pub mod store;

pub use blob::{BlobInfo, BlobStore, FsBlobStore, MemoryBlobStore};
pub use error::{QueryError, SqlbookError};
pub use executor::{PgExecutor, PoolRegistry, PostgresSettings, QueryExecutor};
pub use relative_time::format_relative_time;
pub use runner::{QueryRunner, RunOutcome};
pub use store::{EntryUpdate, TranscriptStore, TranscriptStoreConfig};

/// Result type for sqlbook operations.
pub type Result<T> = std::result::Result<T, SqlbookError>;

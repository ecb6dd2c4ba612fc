//! Shared types for the sqlbook transcript engine.

mod entry;
mod query;
mod session;
mod transcript;

pub use entry::*;
pub use query::*;
pub use session::*;
pub use transcript::*;

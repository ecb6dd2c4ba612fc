//! sqlbook server library - HTTP API over the transcript engine.
//!
//! Separated from main.rs so integration tests can build the router.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;

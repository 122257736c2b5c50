//! Streaming server library
//!
//! Artists register and log in, then manage their tracks grouped in genres.
//! This library exposes the internal modules to the binary and to tests.

pub mod artist;
pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
pub mod sqlite_persistence;
pub mod store;

pub use error::{StreamingError, StreamingResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use store::SqliteStore;

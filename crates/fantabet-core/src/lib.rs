// Library root: re-exports all modules so integration tests and the CLI
// can access the crate's public API.

pub mod auth;
pub mod config;
pub mod draw;
pub mod ingest;
pub mod league;
pub mod lenient;
pub mod service;
pub mod squads;
pub mod stats;
pub mod store;

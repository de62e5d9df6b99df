//! Shared event-ingestion domain primitives.
//!
//! This crate owns the invocation contract, payload and audit-row shaping,
//! archive key layout, configuration, and the error taxonomy. It excludes
//! AWS SDK, Postgres driver, and Lambda runtime concerns; those live in
//! `event_ingest_lambda`.

pub mod config;
pub mod contract;
pub mod credentials;
pub mod error;
pub mod storage_keys;

pub use error::IngestError;

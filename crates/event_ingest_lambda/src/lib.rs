//! AWS-oriented adapters and handlers for queue-triggered event ingestion.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! secret, audit-table, and archive adapters) and re-exports the domain
//! primitives from `event_ingest_core` through a single runtime module.

pub mod adapters;
pub mod handlers;
pub mod runtime;

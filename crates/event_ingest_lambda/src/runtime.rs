//! Domain primitives used by the handlers, re-exported from `event_ingest_core`.

pub use event_ingest_core::{config, contract, credentials, error, storage_keys, IngestError};

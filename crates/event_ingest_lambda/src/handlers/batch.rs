use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::audit_store::{AuditConnection, AuditConnector};
use crate::adapters::object_store::ArchiveStore;
use crate::adapters::secret_store::SecretStore;
use crate::runtime::config::IngestConfig;
use crate::runtime::contract::{
    parse_record_body, AuditRow, BatchEvent, BatchRecord, BatchSummary,
};
use crate::runtime::credentials::{parse_credentials, DbCredentials};
use crate::runtime::storage_keys::new_archive_object_key;
use crate::runtime::IngestError;

/// Service clients shared across invocations, injected by the runtime binary.
pub struct IngestDependencies<'a, S, C, A> {
    pub secrets: &'a S,
    pub connector: &'a C,
    pub archive: &'a A,
}

struct AbortedBatch {
    completed: usize,
    error: IngestError,
}

pub fn resolve_credentials(
    secrets: &impl SecretStore,
    secret_id: &str,
) -> Result<DbCredentials, IngestError> {
    let secret_string = secrets.secret_string(secret_id)?;
    parse_credentials(&secret_string)
}

/// Serializes `payload` and stores it under a fresh date-partitioned key.
pub fn archive_payload(
    archive: &impl ArchiveStore,
    payload: &Value,
    at: DateTime<Utc>,
) -> Result<String, IngestError> {
    let body = serde_json::to_vec(payload).map_err(|error| {
        IngestError::Storage(format!("failed to serialize archive payload: {error}"))
    })?;
    let key = new_archive_object_key(at);
    archive.write_object(&key, &body)?;
    Ok(key)
}

/// Reads configuration through `lookup`, then ingests the batch.
///
/// Configuration errors surface before any secret fetch or connection attempt.
pub fn handle_batch_event_with_lookup<S, C, A>(
    event: &BatchEvent,
    lookup: impl Fn(&str) -> Option<String>,
    deps: IngestDependencies<'_, S, C, A>,
) -> Result<BatchSummary, IngestError>
where
    S: SecretStore,
    C: AuditConnector,
    A: ArchiveStore,
{
    let config = IngestConfig::from_lookup(lookup)?;
    handle_batch_event(event, &config, deps)
}

/// Ingests every record in arrival order: one audit row, then one archive
/// object. The first failure aborts the batch; records handled before it stay
/// written. The connection is closed on both paths.
pub fn handle_batch_event<S, C, A>(
    event: &BatchEvent,
    config: &IngestConfig,
    deps: IngestDependencies<'_, S, C, A>,
) -> Result<BatchSummary, IngestError>
where
    S: SecretStore,
    C: AuditConnector,
    A: ArchiveStore,
{
    let started_at = Instant::now();
    let record_count = event.records.len();
    info!(
        records = record_count,
        bucket = %config.bucket,
        db_host = %config.database.host,
        db_name = %config.database.database,
        "batch_started"
    );

    let credentials = resolve_credentials(deps.secrets, &config.secret_id)?;
    let mut connection = deps.connector.open(&config.database, &credentials)?;

    let outcome = ingest_records(&event.records, &mut connection, deps.archive);
    let close_result = connection.close();

    match outcome {
        Ok(()) => {
            close_result?;
            info!(
                processed = record_count,
                duration_ms = elapsed_ms(started_at),
                "batch_completed"
            );
            Ok(BatchSummary::ok(record_count))
        }
        Err(aborted) => {
            if let Err(close_error) = close_result {
                warn!(error = %close_error, "failed to close audit connection after abort");
            }
            error!(
                records = record_count,
                completed = aborted.completed,
                error_kind = aborted.error.kind(),
                error = %aborted.error,
                duration_ms = elapsed_ms(started_at),
                "batch_failed"
            );
            Err(aborted.error)
        }
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn ingest_records(
    records: &[BatchRecord],
    connection: &mut impl AuditConnection,
    archive: &impl ArchiveStore,
) -> Result<(), AbortedBatch> {
    for (index, record) in records.iter().enumerate() {
        ingest_record(index, record, connection, archive).map_err(|error| AbortedBatch {
            completed: index,
            error,
        })?;
    }
    Ok(())
}

fn ingest_record(
    index: usize,
    record: &BatchRecord,
    connection: &mut impl AuditConnection,
    archive: &impl ArchiveStore,
) -> Result<(), IngestError> {
    let parsed = parse_record_body(&record.body);
    if !parsed.is_parsed() {
        debug!(index, "record body is not JSON, storing raw wrapper");
    }
    let payload = parsed.into_payload();

    let row = AuditRow::from_payload(&payload);
    connection.insert(&row)?;
    let archive_key = archive_payload(archive, &payload, Utc::now())?;

    debug!(
        index,
        event_type = row.event_type.as_deref(),
        archive_key = %archive_key,
        "record_ingested"
    );
    Ok(())
}

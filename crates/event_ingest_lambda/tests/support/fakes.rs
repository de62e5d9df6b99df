use std::sync::{Arc, Mutex};

use event_ingest_lambda::adapters::audit_store::{AuditConnection, AuditConnector};
use event_ingest_lambda::adapters::object_store::ArchiveStore;
use event_ingest_lambda::adapters::secret_store::SecretStore;
use event_ingest_lambda::runtime::config::DatabaseTarget;
use event_ingest_lambda::runtime::contract::AuditRow;
use event_ingest_lambda::runtime::credentials::DbCredentials;
use event_ingest_lambda::runtime::IngestError;

pub const TEST_SECRET: &str = r#"{"username":"ingest","password":"pw","engine":"postgres"}"#;

pub fn test_env(name: &str) -> Option<String> {
    match name {
        "SECRET_ARN" => {
            Some("arn:aws:secretsmanager:eu-west-1:000000000000:secret:audit-db".to_string())
        }
        "DB_HOST" => Some("audit.local".to_string()),
        "DB_NAME" => Some("audit".to_string()),
        "S3_BUCKET" => Some("event-archive".to_string()),
        _ => None,
    }
}

#[derive(Default)]
pub struct RecordingSecrets {
    secret: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl RecordingSecrets {
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: Some(secret.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl SecretStore for RecordingSecrets {
    fn secret_string(&self, secret_id: &str) -> Result<String, IngestError> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(secret_id.to_string());
        self.secret
            .clone()
            .ok_or_else(|| IngestError::Credential(format!("secret {secret_id} not found")))
    }
}

#[derive(Debug, Default)]
pub struct DbLog {
    pub opened: Vec<(DatabaseTarget, String)>,
    pub rows: Vec<AuditRow>,
    pub closed: usize,
}

#[derive(Default)]
pub struct RecordingDb {
    log: Arc<Mutex<DbLog>>,
    refuse_connect: bool,
    fail_on_insert: Option<usize>,
}

impl RecordingDb {
    pub fn refusing_connections() -> Self {
        Self {
            refuse_connect: true,
            ..Self::default()
        }
    }

    pub fn failing_on_insert(index: usize) -> Self {
        Self {
            fail_on_insert: Some(index),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<AuditRow> {
        self.log.lock().expect("poisoned mutex").rows.clone()
    }

    pub fn opened(&self) -> Vec<(DatabaseTarget, String)> {
        self.log.lock().expect("poisoned mutex").opened.clone()
    }

    pub fn closed(&self) -> usize {
        self.log.lock().expect("poisoned mutex").closed
    }
}

pub struct RecordingConnection {
    log: Arc<Mutex<DbLog>>,
    fail_on_insert: Option<usize>,
    attempts: usize,
}

impl AuditConnector for RecordingDb {
    type Connection = RecordingConnection;

    fn open(
        &self,
        target: &DatabaseTarget,
        credentials: &DbCredentials,
    ) -> Result<Self::Connection, IngestError> {
        if self.refuse_connect {
            return Err(IngestError::Connection(format!(
                "password authentication failed for user {}",
                credentials.username
            )));
        }
        self.log
            .lock()
            .expect("poisoned mutex")
            .opened
            .push((target.clone(), credentials.username.clone()));
        Ok(RecordingConnection {
            log: Arc::clone(&self.log),
            fail_on_insert: self.fail_on_insert,
            attempts: 0,
        })
    }
}

impl AuditConnection for RecordingConnection {
    fn insert(&mut self, row: &AuditRow) -> Result<(), IngestError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on_insert == Some(attempt) {
            return Err(IngestError::Write("connection reset by peer".to_string()));
        }
        self.log
            .lock()
            .expect("poisoned mutex")
            .rows
            .push(row.clone());
        Ok(())
    }

    fn close(self) -> Result<(), IngestError> {
        self.log.lock().expect("poisoned mutex").closed += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingArchive {
    writes: Mutex<Vec<(String, Vec<u8>)>>,
    fail_on_write: Option<usize>,
    attempts: Mutex<usize>,
}

impl RecordingArchive {
    pub fn failing_on_write(index: usize) -> Self {
        Self {
            fail_on_write: Some(index),
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn raw_bodies(&self) -> Vec<Vec<u8>> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(_, body)| serde_json::from_slice(body).expect("archived body is JSON"))
            .collect()
    }
}

impl ArchiveStore for RecordingArchive {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), IngestError> {
        let mut attempts = self.attempts.lock().expect("poisoned mutex");
        let attempt = *attempts;
        *attempts += 1;
        if self.fail_on_write == Some(attempt) {
            return Err(IngestError::Storage(format!(
                "simulated write failure for key: {key}"
            )));
        }
        self.writes
            .lock()
            .expect("poisoned mutex")
            .push((key.to_string(), body.to_vec()));
        Ok(())
    }
}

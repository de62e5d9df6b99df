use crate::runtime::config::DatabaseTarget;
use crate::runtime::contract::AuditRow;
use crate::runtime::credentials::DbCredentials;
use crate::runtime::IngestError;

/// Opens one audit-table connection per batch.
pub trait AuditConnector {
    type Connection: AuditConnection;

    fn open(
        &self,
        target: &DatabaseTarget,
        credentials: &DbCredentials,
    ) -> Result<Self::Connection, IngestError>;
}

pub trait AuditConnection {
    /// Inserts and commits a single row.
    fn insert(&mut self, row: &AuditRow) -> Result<(), IngestError>;

    fn close(self) -> Result<(), IngestError>;
}

use crate::runtime::IngestError;

/// Write-once blob storage for archived payloads.
pub trait ArchiveStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), IngestError>;
}

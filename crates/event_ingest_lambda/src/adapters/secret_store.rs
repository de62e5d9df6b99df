use crate::runtime::IngestError;

pub trait SecretStore {
    /// Returns the secret's string value. Lookup and access failures map to
    /// [`IngestError::Credential`].
    fn secret_string(&self, secret_id: &str) -> Result<String, IngestError>;
}

use std::fmt;

use serde::Deserialize;

use crate::error::IngestError;

/// Database login resolved from the secret store for one invocation.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parses a secret string of the form `{"username": .., "password": ..}`.
/// Extra fields (engine, host, port, ...) are ignored.
pub fn parse_credentials(secret_string: &str) -> Result<DbCredentials, IngestError> {
    serde_json::from_str(secret_string)
        .map_err(|error| IngestError::Credential(format!("malformed database secret: {error}")))
}

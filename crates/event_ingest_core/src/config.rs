use std::time::Duration;

use crate::error::IngestError;

pub const SECRET_ARN_VAR: &str = "SECRET_ARN";
pub const DB_HOST_VAR: &str = "DB_HOST";
pub const DB_PORT_VAR: &str = "DB_PORT";
pub const DB_NAME_VAR: &str = "DB_NAME";
pub const S3_BUCKET_VAR: &str = "S3_BUCKET";

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the audit table lives. Credentials are resolved separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub secret_id: String,
    pub database: DatabaseTarget,
    pub bucket: String,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IngestError> {
        let required = |name: &str| -> Result<String, IngestError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(IngestError::Config(format!("{name} must be configured"))),
            }
        };

        let secret_id = required(SECRET_ARN_VAR)?;
        let host = required(DB_HOST_VAR)?;
        let port = match lookup(DB_PORT_VAR) {
            Some(value) if !value.trim().is_empty() => parse_port(&value)?,
            _ => DEFAULT_DB_PORT,
        };
        let database = required(DB_NAME_VAR)?;
        let bucket = required(S3_BUCKET_VAR)?;

        Ok(Self {
            secret_id,
            database: DatabaseTarget {
                host,
                port,
                database,
                connect_timeout: DB_CONNECT_TIMEOUT,
            },
            bucket,
        })
    }
}

fn parse_port(value: &str) -> Result<u16, IngestError> {
    value.trim().parse::<u16>().map_err(|error| {
        IngestError::Config(format!(
            "{DB_PORT_VAR} must be a valid port number, got {value:?}: {error}"
        ))
    })
}

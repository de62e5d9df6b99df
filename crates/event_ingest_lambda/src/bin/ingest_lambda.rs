use std::future::Future;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use event_ingest_lambda::adapters::audit_store::{AuditConnection, AuditConnector};
use event_ingest_lambda::adapters::object_store::ArchiveStore;
use event_ingest_lambda::adapters::secret_store::SecretStore;
use event_ingest_lambda::handlers::batch::{handle_batch_event, IngestDependencies};
use event_ingest_lambda::runtime::config::{DatabaseTarget, IngestConfig};
use event_ingest_lambda::runtime::contract::{AuditRow, BatchEvent, BatchSummary};
use event_ingest_lambda::runtime::credentials::DbCredentials;
use event_ingest_lambda::runtime::IngestError;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;
use tracing_subscriber::EnvFilter;

const INSERT_AUDIT_ROW_SQL: &str =
    "INSERT INTO audit.events (source, event_type, payload) VALUES ($1, $2, $3)";

fn run_blocking<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretStore for SecretsManagerStore {
    fn secret_string(&self, secret_id: &str) -> Result<String, IngestError> {
        let client = self.client.clone();
        let output = run_blocking(async move {
            client.get_secret_value().secret_id(secret_id).send().await
        })
        .map_err(|error| {
            IngestError::Credential(format!(
                "failed to read secret {secret_id}: {}",
                aws_sdk_secretsmanager::error::DisplayErrorContext(&error)
            ))
        })?;

        secret_string_from_output(secret_id, &output)
    }
}

/// Binary-only secrets carry no credentials JSON and are rejected.
fn secret_string_from_output(
    secret_id: &str,
    output: &GetSecretValueOutput,
) -> Result<String, IngestError> {
    output.secret_string().map(str::to_string).ok_or_else(|| {
        IngestError::Credential(format!("secret {secret_id} has no string value"))
    })
}

struct S3ArchiveStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl ArchiveStore for S3ArchiveStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), IngestError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        run_blocking(async move {
            client
                .put_object()
                .bucket(bucket)
                .key(object_key)
                .content_type("application/json")
                .body(ByteStream::from(body_bytes))
                .send()
                .await
                .map(|_| ())
        })
        .map_err(|error| {
            IngestError::Storage(format!(
                "failed to write object {key} to s3://{}: {}",
                self.bucket,
                aws_sdk_s3::error::DisplayErrorContext(&error)
            ))
        })
    }
}

struct PostgresConnector;

struct PostgresAuditConnection {
    client: tokio_postgres::Client,
    driver: JoinHandle<()>,
}

impl AuditConnector for PostgresConnector {
    type Connection = PostgresAuditConnection;

    fn open(
        &self,
        target: &DatabaseTarget,
        credentials: &DbCredentials,
    ) -> Result<Self::Connection, IngestError> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(target.host.as_str())
            .port(target.port)
            .dbname(target.database.as_str())
            .user(credentials.username.as_str())
            .password(credentials.password.as_str())
            .connect_timeout(target.connect_timeout);

        let (client, connection) = run_blocking(pg_config.connect(NoTls)).map_err(|error| {
            IngestError::Connection(format!(
                "failed to connect to {}:{}/{}: {error}",
                target.host, target.port, target.database
            ))
        })?;

        let driver = tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(error = %error, "audit connection terminated");
            }
        });

        Ok(PostgresAuditConnection { client, driver })
    }
}

impl AuditConnection for PostgresAuditConnection {
    fn insert(&mut self, row: &AuditRow) -> Result<(), IngestError> {
        let params: [&(dyn ToSql + Sync); 3] = [&row.source, &row.event_type, &row.payload];
        let client = &mut self.client;

        run_blocking(async move {
            let transaction = client.transaction().await?;
            transaction.execute(INSERT_AUDIT_ROW_SQL, &params).await?;
            transaction.commit().await
        })
        .map_err(|error| IngestError::Write(format!("failed to insert audit row: {error}")))
    }

    fn close(self) -> Result<(), IngestError> {
        let Self { client, driver } = self;
        drop(client);
        run_blocking(driver).map_err(|error| {
            IngestError::Connection(format!("audit connection driver failed: {error}"))
        })
    }
}

struct ServiceClients {
    secrets_client: aws_sdk_secretsmanager::Client,
    s3_client: aws_sdk_s3::Client,
}

async fn handle_request(
    event: LambdaEvent<BatchEvent>,
    clients: &ServiceClients,
) -> Result<BatchSummary, Error> {
    let (batch, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    let summary = span.in_scope(|| {
        let config = IngestConfig::from_env()?;
        let secrets = SecretsManagerStore {
            client: clients.secrets_client.clone(),
        };
        let archive = S3ArchiveStore {
            bucket: config.bucket.clone(),
            s3_client: clients.s3_client.clone(),
        };

        handle_batch_event(
            &batch,
            &config,
            IngestDependencies {
                secrets: &secrets,
                connector: &PostgresConnector,
                archive: &archive,
            },
        )
    })?;

    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let clients = ServiceClients {
        secrets_client: aws_sdk_secretsmanager::Client::new(&aws_config),
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &clients))).await
}

#[cfg(test)]
mod tests {
    use aws_sdk_secretsmanager::primitives::Blob;

    use super::*;

    #[test]
    fn string_secret_is_returned_verbatim() {
        let output = GetSecretValueOutput::builder()
            .secret_string(r#"{"username":"ingest","password":"pw"}"#)
            .build();

        let secret = secret_string_from_output("audit-db", &output).expect("string secret");
        assert_eq!(secret, r#"{"username":"ingest","password":"pw"}"#);
    }

    #[test]
    fn binary_only_secret_is_credential_error() {
        let output = GetSecretValueOutput::builder()
            .secret_binary(Blob::new(b"opaque".to_vec()))
            .build();

        let error = secret_string_from_output("audit-db", &output).expect_err("binary secret");
        assert_eq!(
            error,
            IngestError::Credential("secret audit-db has no string value".to_string())
        );
    }
}

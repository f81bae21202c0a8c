//! MySQL replication-readiness checks.
//!
//! A [`ReplicationChecker`] opens one short-lived connection per check, reads
//! the binlog server variables on that session and folds every outcome,
//! including driver failures, into a [`ReplicationStatus`].

mod checks;

use std::future::Future;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor, Row};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ConnectionCredential, ReplicationStatus};

use checks::{BinlogVariables, BINLOG_FORMAT, BINLOG_ROW_IMAGE, LOG_BIN, SERVER_ID};

#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Host unreachable, authentication rejected, unknown database.
    #[error("{0}")]
    Connection(#[source] sqlx::Error),

    #[error("{variable}: {source}")]
    Query {
        variable: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The server does not know the variable (older or non-MySQL server).
    #[error("server variable '{0}' is not defined on this server")]
    MissingVariable(&'static str),

    #[error("replication check timed out after {0:?}")]
    Timeout(Duration),
}

pub struct ReplicationChecker {
    credential: ConnectionCredential,
    timeout: Duration,
}

impl ReplicationChecker {
    pub fn new(credential: ConnectionCredential, timeout: Duration) -> Self {
        Self {
            credential,
            timeout,
        }
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.credential.host)
            .port(self.credential.port)
            .username(&self.credential.user)
            .password(&self.credential.password)
            .database(&self.credential.dbname)
    }

    async fn connect(&self) -> Result<MySqlConnection, ReplicationError> {
        MySqlConnection::connect_with(&self.connect_options())
            .await
            .map_err(ReplicationError::Connection)
    }

    /// Open and immediately close a connection.
    pub async fn check_connection(&self) -> ReplicationStatus {
        let outcome = self
            .bounded(async {
                let conn = self.connect().await?;
                release(conn).await;
                Ok::<_, ReplicationError>(())
            })
            .await;

        match outcome {
            Ok(()) => {
                info!(host = %self.credential.host, port = self.credential.port, "MySQL connection check passed");
                ReplicationStatus::ready("Connected successfully")
            }
            Err(e) => {
                warn!(host = %self.credential.host, port = self.credential.port, error = %e, "MySQL connection check failed");
                ReplicationStatus::failed(e.to_string())
            }
        }
    }

    /// Verify the server is configured for row-based binlog replication.
    pub async fn check_binlog_status(&self) -> ReplicationStatus {
        let status = binlog_status(self.bounded(self.fetch_binlog_variables()).await);

        if status.success {
            info!(host = %self.credential.host, message = %status.message, "Binlog check passed");
        } else {
            warn!(host = %self.credential.host, message = %status.message, "Binlog check failed");
        }
        status
    }

    async fn fetch_binlog_variables(&self) -> Result<BinlogVariables, ReplicationError> {
        let mut conn = self.connect().await?;
        let result = read_binlog_variables(&mut conn).await;
        release(conn).await;
        result
    }

    /// Dropping the future on timeout drops any connection it holds.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, ReplicationError>>,
    ) -> Result<T, ReplicationError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ReplicationError::Timeout(self.timeout))?
    }
}

/// A session that can answer `SHOW VARIABLES` lookups.
pub trait VariableSource {
    /// Value of `name`, or `None` when the server returns no row.
    fn show_variable(
        &mut self,
        name: &'static str,
    ) -> impl Future<Output = Result<Option<String>, sqlx::Error>> + Send;
}

fn show_variables_sql(name: &str) -> String {
    format!("SHOW VARIABLES LIKE '{}'", name)
}

impl VariableSource for MySqlConnection {
    /// `SHOW VARIABLES` yields `(Variable_name, Value)`; the value is column 1.
    async fn show_variable(
        &mut self,
        name: &'static str,
    ) -> Result<Option<String>, sqlx::Error> {
        let sql = show_variables_sql(name);
        match self.fetch_optional(sql.as_str()).await? {
            Some(row) => row.try_get_unchecked::<String, _>(1).map(Some),
            None => Ok(None),
        }
    }
}

/// Reads all four variables, in check order, before anything is evaluated.
async fn read_binlog_variables<S: VariableSource>(
    source: &mut S,
) -> Result<BinlogVariables, ReplicationError> {
    let log_bin = read_variable(source, LOG_BIN).await?;
    let binlog_format = read_variable(source, BINLOG_FORMAT).await?;
    let binlog_row_image = read_variable(source, BINLOG_ROW_IMAGE).await?;
    let server_id = read_variable(source, SERVER_ID).await?;

    Ok(BinlogVariables {
        log_bin,
        binlog_format,
        binlog_row_image,
        server_id,
    })
}

async fn read_variable<S: VariableSource>(
    source: &mut S,
    variable: &'static str,
) -> Result<String, ReplicationError> {
    let value = source
        .show_variable(variable)
        .await
        .map_err(|source| ReplicationError::Query { variable, source })?
        .ok_or(ReplicationError::MissingVariable(variable))?;

    debug!(variable, value = %value, "Read server variable");
    Ok(value)
}

fn binlog_status(result: Result<BinlogVariables, ReplicationError>) -> ReplicationStatus {
    match result {
        Ok(vars) => vars.status(),
        Err(e) => ReplicationStatus::failed(e.to_string()),
    }
}

async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "MySQL connection did not close cleanly");
    }
}

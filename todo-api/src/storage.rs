use crate::config::Config;
use migration::MigratorTrait;
use sea_orm::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, RuntimeErr, SqlxPostgresConnector,
    Statement, Value,
};
use std::time::Duration;

/// Errors raised by the storage handle.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No connection could be acquired from the pool.
    #[error("Could not acquire a database connection: {0}")]
    Connection(#[source] DbErr),
    /// The database rejected the statement or returned rows that could not be decoded.
    #[error("Statement rejected by the database: {0}")]
    Query(#[source] DbErr),
    /// The todos schema could not be created.
    #[error("Failed to ensure the todos schema: {0}")]
    Schema(#[source] DbErr),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StorageError::Connection(err),
            _ => StorageError::Query(err),
        }
    }
}

/// Pooled access to the todos database.
///
/// Constructed once at startup and shared behind an `Arc`. Every call to
/// [`StorageHandle::execute`] checks a connection out of the pool and hands it
/// back when the statement finishes, whether it succeeded or not.
#[derive(Debug)]
pub struct StorageHandle {
    db: DatabaseConnection,
}

impl StorageHandle {
    /// Builds the connection pool described by `config`.
    ///
    /// The pool connects lazily, so unreachable or misconfigured databases are
    /// reported by the first statement rather than here. Only a malformed
    /// `DB_URL` is rejected up front.
    #[tracing::instrument(skip(config))]
    pub async fn connect(config: &Config) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(connect_options(config)?);

        tracing::info!(
            "Connection pool created for {}:{}/{}",
            config.db_host,
            config.db_port,
            config.db_name
        );
        Ok(Self {
            db: SqlxPostgresConnector::from_sqlx_postgres_pool(pool),
        })
    }

    /// Wraps an existing connection, e.g. a mock connection in tests.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs one parameterized statement and returns the rows it produced.
    #[tracing::instrument(skip(self, values))]
    pub async fn execute(
        &self,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<Vec<QueryResult>, StorageError> {
        let statement = Statement::from_sql_and_values(self.db.get_database_backend(), sql, values);
        let rows = self.db.query_all(statement).await?;
        tracing::debug!("Statement returned {} row(s)", rows.len());
        Ok(rows)
    }

    /// Creates the todos table if it does not exist yet. Safe to call on every start.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        migration::Migrator::up(&self.db, None)
            .await
            .map_err(StorageError::Schema)?;
        tracing::info!("Todos schema is up to date");
        Ok(())
    }

    /// Closes every pooled connection. Statements issued afterwards fail with
    /// [`StorageError::Connection`].
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) {
        if let DatabaseConnection::SqlxPostgresPoolConnection(_) = &self.db {
            self.db.get_postgres_connection_pool().close().await;
        }
        tracing::info!("Database connections closed");
    }

    #[cfg(test)]
    pub(crate) fn into_transaction_log(self) -> Vec<sea_orm::Transaction> {
        self.db.into_transaction_log()
    }
}

/// Connection options from `DB_URL`, or from the individual `DB_*` parts. The
/// parts are passed to the driver as-is, so credentials need no URL escaping.
fn connect_options(config: &Config) -> Result<PgConnectOptions, StorageError> {
    match &config.db_url {
        Some(url) => url.parse::<PgConnectOptions>().map_err(|err| {
            StorageError::Connection(DbErr::Conn(RuntimeErr::Internal(format!(
                "DB_URL is not a valid PostgreSQL URL: {err}"
            ))))
        }),
        None => Ok(PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .username(&config.db_user)
            .password(&config.db_password)
            .database(&config.db_name)),
    }
}

pub mod customer;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::error::ErrorKind;
use sqlx::AnyPool;
use tracing::info;

use crate::domain::StorageError;
use crate::Database;

pub use self::customer::*;

impl From<sqlx::Error> for StorageError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::ConnectionError(Box::new(value)),
            sqlx::Error::Database(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::UniqueViolation
                        | ErrorKind::ForeignKeyViolation
                        | ErrorKind::NotNullViolation
                        | ErrorKind::CheckViolation
                ) =>
            {
                Self::WriteError(Box::new(value))
            }
            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => Self::ReadError(Box::new(value)),
            _ => Self::QueryError(Box::new(value)),
        }
    }
}

/// Opens the process-wide pool. Both MySQL and SQLite urls are accepted.
pub async fn connect(config: &Database) -> Result<AnyPool, StorageError> {
    install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;
    info!(max_connections = config.max_connections, "connected to database");
    Ok(pool)
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use sqlx::any::{install_default_drivers, AnyPoolOptions};
    use sqlx::AnyPool;

    /// Single-connection in-memory database holding an empty `Clientes` table.
    pub async fn memory_pool() -> AnyPool {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite is always available");
        sqlx::query(include_str!("../schema/sqlite.sql"))
            .execute(&pool)
            .await
            .expect("schema is valid sqlite");
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolClosed),
            StorageError::ConnectionError(_)
        ));
        assert!(matches!(
            StorageError::from(sqlx::Error::RowNotFound),
            StorageError::ReadError(_)
        ));
        assert!(matches!(
            StorageError::from(sqlx::Error::Protocol("unexpected packet".to_owned())),
            StorageError::QueryError(_)
        ));
    }

    #[tokio::test]
    async fn test_connect_sqlite() {
        let pool = connect(&Database {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        })
        .await
        .unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let result = connect(&Database {
            url: "nosuchdb://localhost/clientes".to_owned(),
            max_connections: 1,
        })
        .await;
        assert!(result.is_err());
    }
}

use async_trait::async_trait;
use sqlx::{AnyPool, FromRow};
use tracing::{debug, error, info};

use crate::domain::customer::{
    Customer, CustomerId, CustomerInput, CustomerRepository, InsertResult, UpdateResult,
};
use crate::domain::StorageError;

const SELECT_ALL: &str = "SELECT id, Nome, Idade, UF FROM Clientes";
const SELECT_BY_ID: &str = "SELECT id, Nome, Idade, UF FROM Clientes WHERE id = ?";
const INSERT: &str = "INSERT INTO Clientes (Nome, Idade, UF) VALUES (?, ?, ?)";
const UPDATE: &str = "UPDATE Clientes SET Nome = ?, Idade = ?, UF = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM Clientes WHERE id = ?";
const LAST_ROWID: &str = "SELECT last_insert_rowid()";

#[derive(FromRow)]
struct CustomerRow {
    id: i64,
    #[sqlx(rename = "Nome")]
    name: String,
    #[sqlx(rename = "Idade")]
    age: i64,
    #[sqlx(rename = "UF")]
    state: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            age: row.age,
            state: row.state,
        }
    }
}

#[derive(Clone)]
pub struct SqlCustomerRepository {
    pool: AnyPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

fn log_failure(operation: &str, e: sqlx::Error) -> StorageError {
    error!(operation, error = %e, "customer query failed");
    e.into()
}

#[async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, StorageError> {
        let rows = sqlx::query_as::<_, CustomerRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("list", e))?;
        debug!(count = rows.len(), "listed customers");
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Vec<Customer>, StorageError> {
        let rows = sqlx::query_as::<_, CustomerRow>(SELECT_BY_ID)
            .bind(*id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("get_by_id", e))?;
        debug!(%id, count = rows.len(), "fetched customer");
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn create(&self, input: &CustomerInput) -> Result<InsertResult, StorageError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| log_failure("create", e))?;
        let done = sqlx::query(INSERT)
            .bind(input.name.as_str())
            .bind(input.age)
            .bind(input.state.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| log_failure("create", e))?;
        // SQLite only exposes the new rowid through a query on the same connection.
        let insert_id = match done.last_insert_id() {
            Some(id) => id,
            None => sqlx::query_scalar::<_, i64>(LAST_ROWID)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| log_failure("create", e))?,
        };
        let result = InsertResult {
            insert_id: insert_id.into(),
            affected_rows: done.rows_affected(),
        };
        info!(id = %result.insert_id, "customer created");
        Ok(result)
    }

    async fn update(
        &self,
        input: &CustomerInput,
        id: CustomerId,
    ) -> Result<UpdateResult, StorageError> {
        let done = sqlx::query(UPDATE)
            .bind(input.name.as_str())
            .bind(input.age)
            .bind(input.state.as_str())
            .bind(*id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("update", e))?;
        info!(%id, affected_rows = done.rows_affected(), "customer updated");
        Ok(UpdateResult {
            affected_rows: done.rows_affected(),
        })
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<bool, StorageError> {
        let done = sqlx::query(DELETE_BY_ID)
            .bind(*id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("delete_by_id", e))?;
        info!(%id, affected_rows = done.rows_affected(), "customer deleted");
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::customer::{Customer, CustomerId, CustomerInput, CustomerRepository};
    use crate::domain::StorageError;
    use crate::infrastructure::testing::memory_pool;

    use super::SqlCustomerRepository;

    fn input(name: &str, age: i64, state: &str) -> CustomerInput {
        CustomerInput::new(name.to_owned(), age, state.to_owned()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = SqlCustomerRepository::new(memory_pool().await);

        let created = repo.create(&input("Ana Silva", 34, "SP")).await.unwrap();
        assert_eq!(created.affected_rows, 1);
        assert_eq!(
            repo.list().await.unwrap(),
            vec![Customer::new(created.insert_id, input("Ana Silva", 34, "SP"))]
        );

        assert_eq!(
            repo.get_by_id(created.insert_id).await.unwrap(),
            vec![Customer::new(created.insert_id, input("Ana Silva", 34, "SP"))]
        );
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let repo = SqlCustomerRepository::new(memory_pool().await);

        let first = repo.create(&input("Maria", 28, "BA")).await.unwrap();
        let second = repo.create(&input("Maria", 28, "BA")).await.unwrap();
        assert_ne!(first.insert_id, second.insert_id);

        let ids = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect::<Vec<_>>();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.insert_id));
        assert!(ids.contains(&second.insert_id));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_empty() {
        let repo = SqlCustomerRepository::new(memory_pool().await);
        assert!(repo.get_by_id(CustomerId::from(999)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_affects_nothing() {
        let repo = SqlCustomerRepository::new(memory_pool().await);
        let result = repo
            .update(&input("Ninguém", 1, "AC"), CustomerId::from(999))
            .await
            .unwrap();
        assert_eq!(result.affected_rows, 0);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = SqlCustomerRepository::new(memory_pool().await);
        let created = repo.create(&input("Pedro", 52, "PR")).await.unwrap();

        assert!(repo.delete_by_id(created.insert_id).await.unwrap());
        assert!(!repo.delete_by_id(created.insert_id).await.unwrap());
        assert!(repo.get_by_id(created.insert_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_lifecycle() {
        let repo = SqlCustomerRepository::new(memory_pool().await);
        assert!(repo.list().await.unwrap().is_empty());

        let id = repo
            .create(&input("João", 40, "RJ"))
            .await
            .unwrap()
            .insert_id;
        assert_eq!(
            repo.list().await.unwrap(),
            vec![Customer::new(id, input("João", 40, "RJ"))]
        );

        let updated = repo
            .update(&input("João Pedro", 41, "MG"), id)
            .await
            .unwrap();
        assert_eq!(updated.affected_rows, 1);
        assert_eq!(
            repo.get_by_id(id).await.unwrap(),
            vec![Customer::new(id, input("João Pedro", 41, "MG"))]
        );

        assert!(repo.delete_by_id(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_error() {
        let pool = memory_pool().await;
        let repo = SqlCustomerRepository::new(pool.clone());
        pool.close().await;

        assert!(matches!(
            repo.list().await,
            Err(StorageError::ConnectionError(_))
        ));
    }
}

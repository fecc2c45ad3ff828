use async_trait::async_trait;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Id, StorageError};

/// Customer repository (the records service)
///
/// Every operation maps to exactly one SQL statement. Zero matching rows is
/// never an error here: reads return an empty list, writes report zero
/// affected rows.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Returns every customer in storage scan order
    async fn list(&self) -> Result<Vec<Customer>, StorageError>;
    /// Returns the customers whose id matches (zero or one)
    async fn get_by_id(&self, id: CustomerId) -> Result<Vec<Customer>, StorageError>;
    /// Inserts a customer; storage assigns the id
    async fn create(&self, input: &CustomerInput) -> Result<InsertResult, StorageError>;
    /// Overwrites every field of the customer with the given id
    async fn update(
        &self,
        input: &CustomerInput,
        id: CustomerId,
    ) -> Result<UpdateResult, StorageError>;
    /// Deletes the customer; `true` when a row was removed
    async fn delete_by_id(&self, id: CustomerId) -> Result<bool, StorageError>;
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Deref,
    Default,
)]
pub struct CustomerId(i64);

impl Id for CustomerId {
    type Inner = i64;
}

/// Persisted customer, serialized with the table's column names
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Idade")]
    pub age: i64,
    #[serde(rename = "UF")]
    pub state: String,
}

impl Customer {
    pub fn new(id: CustomerId, input: CustomerInput) -> Self {
        Self {
            id,
            name: input.name,
            age: input.age,
            state: input.state,
        }
    }
}

/// Fields a caller supplies on create and update. All are required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Idade")]
    pub age: i64,
    #[serde(rename = "UF")]
    pub state: String,
}

impl CustomerInput {
    pub fn new(name: String, age: i64, state: String) -> Result<Self, CustomerError> {
        let input = Self { name, age, state };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), CustomerError> {
        if self.name.trim().is_empty() {
            return Err(CustomerError::NameIsBlank);
        }
        if self.age < 0 {
            return Err(CustomerError::NegativeAge(self.age));
        }
        if self.state.trim().is_empty() {
            return Err(CustomerError::StateIsBlank);
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CustomerError {
    #[error("Nome não pode ser vazio")]
    NameIsBlank,
    #[error("Idade não pode ser negativa: {0}")]
    NegativeAge(i64),
    #[error("UF não pode ser vazia")]
    StateIsBlank,
}

/// Outcome of an insert, shaped like the MySQL OK packet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub insert_id: CustomerId,
    pub affected_rows: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub affected_rows: u64,
}

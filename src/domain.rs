pub mod customer;

use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};
use thiserror::Error;

pub trait Id:
    Copy
    + Eq
    + Deref<Target = Self::Inner>
    + From<Self::Inner>
    + Display
    + Debug
    + Serialize
    + for<'de> Deserialize<'de>
{
    type Inner: FromStr;

    /// Parses an id coming from outside (a path segment, a CLI argument).
    fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<Self::Inner>().ok().map(Self::from)
    }
}

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    ConnectionError(BoxError),
    #[error("Database query error: {0}")]
    QueryError(BoxError),
    #[error("Data read error: {0}")]
    ReadError(BoxError),
    #[error("Data write error: {0}")]
    WriteError(BoxError),
}

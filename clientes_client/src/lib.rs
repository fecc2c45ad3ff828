pub mod api;
pub mod registry;

pub use api::{ApiClient, ClientError};
pub use registry::{Alert, CustomerForm, Operation, Registry};

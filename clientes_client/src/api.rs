use clientes::domain::customer::{
    Customer, CustomerId, CustomerInput, InsertResult, UpdateResult,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("server unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),
    #[error("server answered {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed access to the gateway routes
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(ClientError::Unavailable)?;
        let status = response.status();
        debug!(%status, url = %response.url(), "gateway answered");
        if !status.is_success() {
            let message = response.json::<ErrorBody>().await.ok().map(|body| body.error);
            return Err(ClientError::Status { status, message });
        }
        response.json::<T>().await.map_err(ClientError::Decode)
    }

    pub async fn list(&self) -> Result<Vec<Customer>, ClientError> {
        self.send(self.http.get(self.url("/"))).await
    }

    /// `None` when the gateway reports the id as unknown.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, ClientError> {
        let request = self.http.get(self.url(&format!("/clientes/{}", id)));
        match self.send::<Vec<Customer>>(request).await {
            Ok(customers) => Ok(customers.into_iter().next()),
            Err(ClientError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, input: &CustomerInput) -> Result<InsertResult, ClientError> {
        self.send(self.http.post(self.url("/clientes/")).json(input))
            .await
    }

    pub async fn update(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<UpdateResult, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/clientes/{}", id)))
                .json(input),
        )
        .await
    }

    pub async fn delete(&self, id: CustomerId) -> Result<bool, ClientError> {
        self.send(self.http.delete(self.url(&format!("/clientes/{}", id))))
            .await
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clientes::domain::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const INVALID_ID: &str = "ID inválido. Deve ser um número.";
pub const NOT_FOUND: &str = "Cliente não encontrado.";
pub const INTERNAL: &str = "Erro interno do servidor.";
pub const CREATE_FAILED: &str = "Erro ao cadastrar cliente";
pub const UPDATE_FAILED: &str = "Erro ao atualizar cliente";
pub const DELETE_FAILED: &str = "Erro ao deletar cliente";
pub const TOO_LARGE: &str = "Corpo da requisição muito grande.";

/// Failures as the gateway reports them to clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", NOT_FOUND)]
    NotFound,
    #[error("{}", TOO_LARGE)]
    TooLarge,
    /// `message` is what the client sees; `source` is only logged.
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ApiError {
    pub fn invalid_id() -> Self {
        Self::Validation(INVALID_ID.to_owned())
    }

    pub fn storage(message: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Validation(message) => message.as_str(),
            Self::NotFound => NOT_FOUND,
            Self::TooLarge => TOO_LARGE,
            Self::Storage { message, source } => {
                error!(error = %source, "{}", message);
                message
            }
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

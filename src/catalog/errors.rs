//! # Catalog Errors
//!
//! Every error maps to one HTTP status and renders as a flat
//! `{"error": "..."}` body. Messages are user-facing and in Portuguese.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

pub type CatalogResult<T> = Result<T, CatalogError>;

pub const INVALID_RATING: &str = "A avaliação (recommendation) deve ser um número entre 1 e 5.";
pub const INVALID_FILTER_RATING: &str = "A avaliação para filtro deve ser um número entre 1 e 5.";
pub const MISSING_FILTER: &str = "Forneça um gênero ou uma avaliação para filtrar.";
pub const INVALID_BODY: &str = "Corpo da requisição inválido.";
pub const INVALID_PARAMS: &str = "Parâmetros da requisição inválidos.";
pub const NOT_FOUND: &str = "Filme não encontrado.";
pub const INSERT_FAILED: &str = "Erro ao salvar o filme.";
pub const REMOVE_FAILED: &str = "Erro ao remover o filme.";

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Bad or missing rating / filter parameters, or an unreadable body (400)
    #[error("{0}")]
    Validation(&'static str),

    /// Delete target does not exist (404)
    #[error("{}", NOT_FOUND)]
    NotFound,

    /// Persistence failure (500). `message` is what the client sees.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StorageError,
    },
}

impl CatalogError {
    pub fn invalid_rating() -> Self {
        CatalogError::Validation(INVALID_RATING)
    }

    pub fn invalid_filter_rating() -> Self {
        CatalogError::Validation(INVALID_FILTER_RATING)
    }

    pub fn missing_filter() -> Self {
        CatalogError::Validation(MISSING_FILTER)
    }

    pub fn invalid_body() -> Self {
        CatalogError::Validation(INVALID_BODY)
    }

    /// Query string or path segment that could not be decoded
    pub fn invalid_params() -> Self {
        CatalogError::Validation(INVALID_PARAMS)
    }

    pub fn insert_failed(source: StorageError) -> Self {
        CatalogError::Store {
            message: INSERT_FAILED,
            source,
        }
    }

    pub fn remove_failed(source: StorageError) -> Self {
        CatalogError::Store {
            message: REMOVE_FAILED,
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

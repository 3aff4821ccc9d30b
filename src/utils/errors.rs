//! Sistema de manejo de errores
//!
//! Este módulo define la taxonomía de errores de los flujos de registro
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::repositories::StoreError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Renewal is not yet due. Your vehicle is valid until {}.", .valid_until.format("%a %b %d %Y"))]
    RenewalNotDue { valid_until: NaiveDate },

    #[error("Duplicate asset: {0}")]
    DuplicateAsset(String),

    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Credential mismatch: {0}")]
    CredentialMismatch(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

impl AppError {
    /// Código estable expuesto al cliente
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AuthorizationDenied(_) => "AUTHORIZATION_DENIED",
            AppError::RenewalNotDue { .. } => "RENEWAL_NOT_DUE",
            AppError::DuplicateAsset(_) => "DUPLICATE_ASSET",
            AppError::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            AppError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            AppError::CredentialMismatch(_) => "CREDENTIAL_MISMATCH",
            AppError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) | AppError::RenewalNotDue { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::PaymentNotFound(_) | AppError::CredentialMismatch(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            AppError::DuplicateAsset(_) | AppError::DuplicateTransaction(_) => StatusCode::CONFLICT,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Solo los fallos de almacenamiento justifican reintentar el flujo completo
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StorageFailure(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationFailed(errors.to_string())
    }
}

/// Cuerpo JSON ausente, mal formado o sin campos obligatorios
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationFailed(rejection.body_text())
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code().to_string();

        let (message, details) = match &self {
            AppError::StorageFailure(e) => {
                error!("💥 Storage failure: {}", e);
                ("An unexpected error occurred while accessing storage".to_string(), None)
            }
            AppError::RenewalNotDue { valid_until } => {
                warn!("⏳ {}", self);
                (self.to_string(), Some(json!({ "valid_until": valid_until })))
            }
            other => {
                warn!("⚠️ {}", other);
                (other.to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
            details,
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}' not found", resource, id))
}

/// Función helper para crear errores de validación
pub fn validation_error(message: &str) -> AppError {
    AppError::ValidationFailed(message.to_string())
}

//! DTOs de la API
//!
//! Requests y respuestas HTTP. La validación de dominio vive en los modelos;
//! aquí solo se valida la forma.

pub mod api_response;
pub mod licensing_dto;
pub mod registration_dto;
pub mod transfer_dto;

pub use api_response::ApiResponse;

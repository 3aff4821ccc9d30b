//! Utilidades de validación
//!
//! Validadores personalizados usados por los `#[derive(Validate)]`
//! de los modelos de entrada.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Código de oficina RTO: dos letras de estado y uno o dos dígitos (MH-12, KA05)
    pub static ref RTO_OFFICE_CODE: Regex =
        Regex::new(r"^[A-Z]{2}-?[0-9]{1,2}$").expect("RTO office code regex must compile");

    /// Número de chasis/motor: alfanumérico, sin espacios
    pub static ref ASSET_NUMBER: Regex =
        Regex::new(r"^[A-Za-z0-9-]{5,32}$").expect("asset number regex must compile");
}

/// Validar que un string no esté vacío ni sea solo espacios
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe sea estrictamente positivo
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe sea no negativo
pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

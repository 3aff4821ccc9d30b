//! Modelo de Vehicle
//!
//! Activo físico identificado por su número de chasis. Inmutable una vez creado.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, ASSET_NUMBER};

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Validate)]
pub struct Vehicle {
    #[validate(regex = "ASSET_NUMBER")]
    pub chassis_number: String,

    #[validate(regex = "ASSET_NUMBER")]
    pub engine_number: String,

    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub model: String,

    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub vehicle_class: String,

    #[validate(custom = "validate_not_blank", length(max = 30))]
    pub fuel_type: String,
}

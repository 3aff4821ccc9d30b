//! Modelo de Registration
//!
//! Vincula un Vehicle con su Owner. `application_id` es la clave que une
//! seguro, pagos e historial de renovaciones.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, validate_positive_amount, RTO_OFFICE_CODE};

/// Años de validez de un registro (alta y cada renovación)
pub const VALIDITY_YEARS: u32 = 15;

/// Estado inicial de toda solicitud
pub const STATUS_SUBMITTED: &str = "Submitted";

/// Registration - mapea a la tabla registrations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Registration {
    pub application_id: i64,
    pub owner_id: i64,
    pub chassis_number: String,
    pub registration_number: String,
    pub rto_office_code: String,
    pub application_status: String,
    pub application_date: NaiveDate,
    pub dealer_name: String,
    pub purchase_date: NaiveDate,
    pub ex_showroom_price: Decimal,
    pub road_tax_amount: Decimal,
    pub registration_date: NaiveDate,
    pub valid_until: NaiveDate,
}

/// Datos de registro aportados por el solicitante
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationDetails {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub dealer_name: String,

    pub purchase_date: NaiveDate,

    #[validate(custom = "validate_positive_amount")]
    pub ex_showroom_price: Decimal,

    #[validate(regex = "RTO_OFFICE_CODE")]
    pub rto_office_code: String,
}

/// Fila a insertar; el id lo asigna el almacenamiento
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub owner_id: i64,
    pub chassis_number: String,
    pub registration_number: String,
    pub rto_office_code: String,
    pub application_status: String,
    pub application_date: NaiveDate,
    pub dealer_name: String,
    pub purchase_date: NaiveDate,
    pub ex_showroom_price: Decimal,
    pub road_tax_amount: Decimal,
    pub registration_date: NaiveDate,
    pub valid_until: NaiveDate,
}

impl NewRegistration {
    pub fn into_registration(self, application_id: i64) -> Registration {
        Registration {
            application_id,
            owner_id: self.owner_id,
            chassis_number: self.chassis_number,
            registration_number: self.registration_number,
            rto_office_code: self.rto_office_code,
            application_status: self.application_status,
            application_date: self.application_date,
            dealer_name: self.dealer_name,
            purchase_date: self.purchase_date,
            ex_showroom_price: self.ex_showroom_price,
            road_tax_amount: self.road_tax_amount,
            registration_date: self.registration_date,
            valid_until: self.valid_until,
        }
    }
}

/// Fin de validez contado desde `from`.
///
/// Meses de calendario: un 29 de febrero cae en el 28 si el año destino no es bisiesto.
pub fn validity_end(from: NaiveDate) -> Option<NaiveDate> {
    from.checked_add_months(Months::new(VALIDITY_YEARS * 12))
}

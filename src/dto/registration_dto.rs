use serde::Deserialize;

use crate::models::{InsuranceDetails, OwnerId, RegistrationDetails, Vehicle};

// Request de alta: datos del vehículo y del registro en el nivel superior,
// la póliza anidada
#[derive(Debug, Deserialize)]
pub struct RegisterVehicleRequest {
    pub user_id: OwnerId,
    #[serde(flatten)]
    pub vehicle: Vehicle,
    #[serde(flatten)]
    pub registration: RegistrationDetails,
    pub insurance: InsuranceDetails,
}

// Request de renovación
#[derive(Debug, Deserialize)]
pub struct RenewRegistrationRequest {
    pub user_id: OwnerId,
    pub registration_number: String,
    pub insurance: InsuranceDetails,
}

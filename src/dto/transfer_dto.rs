use serde::Deserialize;
use validator::Validate;

use crate::models::OwnerId;

// Fase A: el titular actual prepara el pago de transferencia
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransferPaymentRequest {
    #[validate(range(min = 1))]
    pub application_id: i64,
    pub current_owner_id: OwnerId,
    pub new_owner_id: OwnerId,
}

// Fase B: pago confirmado, se reasigna la titularidad
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteTransferRequest {
    #[validate(length(min = 1, max = 64))]
    pub transaction_id: String,
    pub new_owner_id: OwnerId,
    #[validate(length(min = 1, max = 32))]
    pub registration_number: String,
}

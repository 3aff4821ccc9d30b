//! Transferencia de titularidad en dos fases
//!
//! Fase A (`draft_transfer`) deja un pago `Pending` por la tasa de
//! transferencia. Fase B (`complete_transfer`) marca ese pago como pagado y
//! reasigna el titular en la misma transacción. Son transacciones separadas:
//! entre ambas solo existe el pago pendiente.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::database::scoped;
use crate::models::{Owner, OwnerId, PaymentPurpose};
use crate::repositories::{constraints, Store, UnitOfWork};
use crate::services::ledger;
use crate::services::verification_gate::assert_ownership;
use crate::utils::clock::Clock;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Pago de transferencia pendiente
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransferDraft {
    pub transaction_id: String,
    pub amount: Decimal,
    pub application_id: i64,
    pub new_owner_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransferOutcome {
    pub transaction_id: String,
    pub application_id: i64,
    pub registration_number: String,
    pub previous_owner_id: i64,
    pub new_owner_id: i64,
}

pub struct TransferWorkflow<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
    transfer_fee: Decimal,
}

impl<S: Store> TransferWorkflow<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, transfer_fee: Decimal) -> Self {
        Self {
            store,
            clock,
            transfer_fee,
        }
    }

    /// Fase A: verifica la titularidad y crea el pago pendiente
    pub async fn draft_transfer(
        &self,
        application_id: i64,
        current_owner: &OwnerId,
        new_owner: &OwnerId,
    ) -> AppResult<TransferDraft> {
        let new_owner_id = new_owner.to_db_id()?;
        let current_owner = current_owner.clone();
        let amount = self.transfer_fee;

        let draft = scoped(&self.store, "transfer-draft", move |tx| {
            Box::pin(async move {
                let registration = tx
                    .lock_registration(application_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Application {} not found", application_id)))?;

                assert_ownership(&registration, &current_owner)?;

                if registration.owner_id == new_owner_id {
                    return Err(AppError::ValidationFailed(
                        "New owner must be different from the current owner".to_string(),
                    ));
                }
                if !tx.owner_exists(new_owner_id).await? {
                    return Err(AppError::NotFound(format!("Owner {} not found", new_owner_id)));
                }

                let transaction_id = ledger::create_pending_payment(
                    tx,
                    application_id,
                    PaymentPurpose::OwnershipTransfer,
                    amount,
                    Some(new_owner_id),
                )
                .await?;

                Ok(TransferDraft {
                    transaction_id,
                    amount,
                    application_id,
                    new_owner_id,
                })
            })
        })
        .await?;

        info!(
            "📄 Transferencia preparada para solicitud {} → usuario {} ({})",
            draft.application_id, draft.new_owner_id, draft.transaction_id
        );
        Ok(draft)
    }

    /// Fase B: pago y cambio de titular, atómicamente
    pub async fn complete_transfer(
        &self,
        transaction_id: &str,
        new_owner: &OwnerId,
        registration_number: &str,
    ) -> AppResult<TransferOutcome> {
        let transaction_id = transaction_id.trim().to_string();
        let registration_number = registration_number.trim().to_string();
        if transaction_id.is_empty() || registration_number.is_empty() {
            return Err(AppError::ValidationFailed(
                "Transaction id and registration number are required".to_string(),
            ));
        }
        let new_owner_id = new_owner.to_db_id()?;
        let paid_at = self.clock.now();

        let outcome = scoped(&self.store, "transfer-complete", move |tx| {
            Box::pin(async move {
                let payment = ledger::mark_paid(tx, &transaction_id, paid_at).await?;

                let registration = tx
                    .lock_registration_by_number(&registration_number)
                    .await?
                    .ok_or_else(|| not_found_error("Registration", &registration_number))?;

                if payment.payment_for != PaymentPurpose::OwnershipTransfer
                    || payment.application_id != registration.application_id
                {
                    return Err(AppError::ValidationFailed(format!(
                        "Payment {} is not a transfer payment for {}",
                        transaction_id, registration_number
                    )));
                }
                if payment.new_owner_id != Some(new_owner_id) {
                    return Err(AppError::AuthorizationDenied(format!(
                        "Payment {} was not drafted for owner {}",
                        transaction_id, new_owner_id
                    )));
                }

                let updated = tx
                    .update_owner(registration.application_id, new_owner_id)
                    .await
                    .map_err(|e| {
                        if e.is_foreign_key(constraints::REGISTRATIONS_OWNER) {
                            AppError::NotFound(format!("Owner {} not found", new_owner_id))
                        } else {
                            AppError::StorageFailure(e)
                        }
                    })?;
                if updated == 0 {
                    return Err(AppError::NotFound(format!(
                        "Registration {} not found",
                        registration_number
                    )));
                }

                Ok(TransferOutcome {
                    transaction_id,
                    application_id: registration.application_id,
                    registration_number,
                    previous_owner_id: registration.owner_id,
                    new_owner_id,
                })
            })
        })
        .await?;

        info!(
            "🔁 Titularidad de {} transferida: {} → {}",
            outcome.registration_number, outcome.previous_owner_id, outcome.new_owner_id
        );
        Ok(outcome)
    }

    /// Comprador buscado por su PAN antes de preparar la transferencia
    pub async fn find_buyer(&self, pan_number: &str) -> AppResult<Owner> {
        let pan_number = pan_number.trim().to_uppercase();
        self.store
            .find_owner_by_government_id(&pan_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user registered with PAN {}", pan_number)))
    }

    pub async fn find_owner(&self, owner: &OwnerId) -> AppResult<Owner> {
        let user_id = owner.to_db_id()?;
        self.store
            .find_owner(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Owner {} not found", user_id)))
    }
}

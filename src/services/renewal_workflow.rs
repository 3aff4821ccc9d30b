//! Renovación de registro
//!
//! Todo ocurre bajo el bloqueo de la fila del registro: la comprobación de
//! vencimiento se hace dentro de la transacción, así que de dos renovaciones
//! simultáneas solo una encuentra el registro vencido.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::database::scoped;
use crate::models::registration::validity_end;
use crate::models::{InsuranceDetails, OwnerId, RenewalHistoryEntry};
use crate::repositories::{constraints, Store, StoreError, UnitOfWork};
use crate::services::verification_gate::{assert_ownership, assert_renewal_due};
use crate::utils::clock::Clock;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenewalOutcome {
    pub application_id: i64,
    pub old_valid_until: NaiveDate,
    pub new_valid_until: NaiveDate,
}

pub struct RenewalWorkflow<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: Store> RenewalWorkflow<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn renew(
        &self,
        owner: &OwnerId,
        registration_number: &str,
        insurance: InsuranceDetails,
    ) -> AppResult<RenewalOutcome> {
        insurance.validate()?;
        let registration_number = registration_number.trim().to_string();
        if registration_number.is_empty() {
            return Err(validation_error("Registration number is required"));
        }

        let owner = owner.clone();
        let today = self.clock.today();

        let outcome = scoped(&self.store, "renewal", move |tx| {
            Box::pin(async move {
                let registration = tx
                    .lock_registration_by_number(&registration_number)
                    .await?
                    .ok_or_else(|| not_found_error("Registration", &registration_number))?;

                assert_ownership(&registration, &owner)?;
                assert_renewal_due(registration.valid_until, today)?;

                let old_valid_until = registration.valid_until;
                let new_valid_until = validity_end(old_valid_until).ok_or_else(|| {
                    AppError::ValidationFailed(format!("Validity date {} is out of range", old_valid_until))
                })?;
                let application_id = registration.application_id;
                let policy = insurance.bind_to(application_id);

                tx.update_valid_until(application_id, new_valid_until).await?;
                tx.replace_insurance(&policy).await.map_err(translate)?;
                tx.append_renewal(&RenewalHistoryEntry {
                    application_id,
                    renewal_date: today,
                    old_valid_until,
                    new_valid_until,
                    new_policy_number: policy.policy_number.clone(),
                })
                .await?;

                Ok(RenewalOutcome {
                    application_id,
                    old_valid_until,
                    new_valid_until,
                })
            })
        })
        .await?;

        info!(
            "🔄 Registro {} renovado: {} → {}",
            outcome.application_id, outcome.old_valid_until, outcome.new_valid_until
        );
        Ok(outcome)
    }
}

fn translate(err: StoreError) -> AppError {
    if err.is_unique(constraints::INSURANCE_POLICY) {
        return AppError::DuplicateAsset("This insurance policy number is already in use".to_string());
    }
    AppError::StorageFailure(err)
}

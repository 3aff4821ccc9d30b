//! Alta de registro
//!
//! Vehicle, Registration, InsurancePolicy y el pago pendiente del impuesto de
//! circulación se escriben en una sola transacción: o persisten los cuatro o
//! ninguno.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::config::FeeSchedule;
use crate::database::scoped;
use crate::models::registration::{validity_end, STATUS_SUBMITTED};
use crate::models::{
    InsuranceDetails, NewRegistration, OwnerId, PaymentPurpose, RegistrationDetails, Vehicle,
};
use crate::repositories::{constraints, Store, StoreError, UnitOfWork};
use crate::services::ledger;
use crate::utils::clock::Clock;
use crate::utils::errors::{AppError, AppResult};

/// Resultado de un alta
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegistrationReceipt {
    pub application_id: i64,
    pub registration_number: String,
    pub transaction_id: String,
    pub road_tax_amount: Decimal,
}

pub struct RegistrationWorkflow<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
    fees: FeeSchedule,
}

impl<S: Store> RegistrationWorkflow<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, fees: FeeSchedule) -> Self {
        Self { store, clock, fees }
    }

    pub async fn submit(
        &self,
        owner: &OwnerId,
        vehicle: Vehicle,
        details: RegistrationDetails,
        insurance: InsuranceDetails,
    ) -> AppResult<RegistrationReceipt> {
        vehicle.validate()?;
        details.validate()?;
        insurance.validate()?;
        let owner_id = owner.to_db_id()?;

        let today = self.clock.today();
        let valid_until = validity_end(details.purchase_date).ok_or_else(|| {
            AppError::ValidationFailed(format!("Purchase date {} is out of range", details.purchase_date))
        })?;
        let road_tax_amount = compute_road_tax(details.ex_showroom_price, self.fees.road_tax_rate);
        let registration_number = temporary_registration_number(&details.rto_office_code);

        let registration = NewRegistration {
            owner_id,
            chassis_number: vehicle.chassis_number.clone(),
            registration_number: registration_number.clone(),
            rto_office_code: details.rto_office_code,
            application_status: STATUS_SUBMITTED.to_string(),
            application_date: today,
            dealer_name: details.dealer_name,
            purchase_date: details.purchase_date,
            ex_showroom_price: details.ex_showroom_price,
            road_tax_amount,
            registration_date: details.purchase_date,
            valid_until,
        };

        info!(
            "📝 Alta de registro: chasis {} para usuario {}",
            vehicle.chassis_number, owner_id
        );

        let receipt = scoped(&self.store, "registration", move |tx| {
            Box::pin(async move {
                tx.insert_vehicle(&vehicle).await.map_err(translate)?;
                let application_id = tx.insert_registration(&registration).await.map_err(translate)?;
                tx.insert_insurance(&insurance.bind_to(application_id))
                    .await
                    .map_err(translate)?;
                let transaction_id = ledger::create_pending_payment(
                    tx,
                    application_id,
                    PaymentPurpose::NewRegistration,
                    road_tax_amount,
                    None,
                )
                .await?;

                Ok(RegistrationReceipt {
                    application_id,
                    registration_number: registration.registration_number,
                    transaction_id,
                    road_tax_amount,
                })
            })
        })
        .await?;

        info!(
            "🚗 Registro {} creado (solicitud {}, impuesto {})",
            receipt.registration_number, receipt.application_id, receipt.road_tax_amount
        );
        Ok(receipt)
    }
}

/// Impuesto de circulación redondeado a céntimos
pub fn compute_road_tax(ex_showroom_price: Decimal, rate: Decimal) -> Decimal {
    (ex_showroom_price * rate).round_dp(2)
}

/// Número provisional `{RTO}-T{10 hex}` hasta la emisión de la placa
pub fn temporary_registration_number(rto_office_code: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-T{}", rto_office_code, &suffix[..10])
}

fn translate(err: StoreError) -> AppError {
    match &err {
        StoreError::UniqueViolation { constraint } => match constraint.as_str() {
            constraints::VEHICLES_CHASSIS => {
                AppError::DuplicateAsset("A vehicle with this chassis number is already registered".to_string())
            }
            constraints::VEHICLES_ENGINE => {
                AppError::DuplicateAsset("A vehicle with this engine number is already registered".to_string())
            }
            constraints::REGISTRATIONS_NUMBER => {
                AppError::DuplicateAsset("Registration number collision, please resubmit".to_string())
            }
            constraints::INSURANCE_POLICY => {
                AppError::DuplicateAsset("This insurance policy number is already in use".to_string())
            }
            _ => AppError::StorageFailure(err),
        },
        StoreError::ForeignKeyViolation { constraint } if constraint == constraints::REGISTRATIONS_OWNER => {
            AppError::NotFound("Owner not found".to_string())
        }
        _ => AppError::StorageFailure(err),
    }
}

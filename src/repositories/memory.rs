//! Backend en memoria
//!
//! Implementa el mismo contrato que PostgreSQL (constraints con los mismos
//! nombres) para pruebas y ejecución local sin base de datos. Una transacción
//! retiene el candado global y trabaja sobre una copia de las tablas; `commit`
//! publica la copia y cualquier otra salida la descarta.
//!
//! `FailPoint` permite forzar el fallo de una escritura concreta, con un error
//! de backend genérico o con el `StoreError` que se indique.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{constraints, Store, StoreError, UnitOfWork};
use crate::models::{
    licence::{LICENCE_STATUS_APPLIED, TEST_STATUS_SCHEDULED},
    DrivingTest, InsurancePolicy, LearnerLicence, NewDrivingTest, NewRegistration, Owner, Payment,
    PaymentStatus, Registration, RenewalHistoryEntry, Vehicle,
};

/// Escrituras que se pueden hacer fallar a propósito
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertVehicle,
    InsertRegistration,
    InsertInsurance,
    ReplaceInsurance,
    InsertPayment,
    MarkPaymentPaid,
    UpdateOwner,
    UpdateValidUntil,
    AppendRenewal,
    Commit,
}

/// Contenido completo del almacén
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub owners: BTreeMap<i64, Owner>,
    pub vehicles: BTreeMap<String, Vehicle>,
    pub registrations: BTreeMap<i64, Registration>,
    pub insurance: BTreeMap<i64, InsurancePolicy>,
    pub payments: BTreeMap<String, Payment>,
    pub renewals: Vec<RenewalHistoryEntry>,
    pub learner_licences: BTreeMap<i64, LearnerLicence>,
    pub driving_tests: BTreeMap<i64, DrivingTest>,
    next_application_id: i64,
    next_llno: i64,
    next_test_id: i64,
}

impl Tables {
    fn registration_by_number(&self, registration_number: &str) -> Option<&Registration> {
        self.registrations
            .values()
            .find(|r| r.registration_number == registration_number)
    }
}

#[derive(Default)]
struct Shared {
    tables: Arc<Mutex<Tables>>,
    fail_point: StdMutex<Option<(FailPoint, StoreError)>>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alta directa de un propietario (la identidad vive fuera del núcleo)
    pub async fn insert_owner(&self, owner: Owner) {
        let mut tables = self.shared.tables.lock().await;
        tables.owners.insert(owner.user_id, owner);
    }

    /// Hace fallar la escritura indicada hasta `clear_failure`
    pub fn fail_on(&self, point: FailPoint) {
        let err = StoreError::Backend(format!("injected failure at {:?}", point));
        self.fail_with(point, err);
    }

    /// Como `fail_on`, devolviendo `err` (p. ej. una colisión de clave)
    pub fn fail_with(&self, point: FailPoint, err: StoreError) {
        *self.fail_point_guard() = Some((point, err));
    }

    pub fn clear_failure(&self) {
        *self.fail_point_guard() = None;
    }

    /// Copia del estado confirmado
    pub async fn snapshot(&self) -> Tables {
        self.shared.tables.lock().await.clone()
    }

    fn fail_point_guard(&self) -> std::sync::MutexGuard<'_, Option<(FailPoint, StoreError)>> {
        self.shared
            .fail_point
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct MemoryUnitOfWork {
    committed: OwnedMutexGuard<Tables>,
    working: Tables,
    shared: Arc<Shared>,
}

impl MemoryUnitOfWork {
    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        let armed = self
            .shared
            .fail_point
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match armed.as_ref() {
            Some((armed_point, err)) if *armed_point == point => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let committed = self.shared.tables.clone().lock_owned().await;
        let working = committed.clone();
        Ok(MemoryUnitOfWork {
            committed,
            working,
            shared: self.shared.clone(),
        })
    }

    async fn find_owner(&self, user_id: i64) -> Result<Option<Owner>, StoreError> {
        Ok(self.shared.tables.lock().await.owners.get(&user_id).cloned())
    }

    async fn find_owner_by_government_id(&self, pan_number: &str) -> Result<Option<Owner>, StoreError> {
        let tables = self.shared.tables.lock().await;
        Ok(tables.owners.values().find(|o| o.pan_number == pan_number).cloned())
    }

    async fn find_vehicle(&self, chassis_number: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.shared.tables.lock().await.vehicles.get(chassis_number).cloned())
    }

    async fn find_registration(&self, registration_number: &str) -> Result<Option<Registration>, StoreError> {
        let tables = self.shared.tables.lock().await;
        Ok(tables.registration_by_number(registration_number).cloned())
    }

    async fn find_insurance(&self, application_id: i64) -> Result<Option<InsurancePolicy>, StoreError> {
        Ok(self.shared.tables.lock().await.insurance.get(&application_id).cloned())
    }

    async fn find_payment(&self, transaction_id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self.shared.tables.lock().await.payments.get(transaction_id).cloned())
    }

    async fn renewal_history(&self, application_id: i64) -> Result<Vec<RenewalHistoryEntry>, StoreError> {
        let tables = self.shared.tables.lock().await;
        Ok(tables
            .renewals
            .iter()
            .filter(|e| e.application_id == application_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn owner_exists(&mut self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.working.owners.contains_key(&user_id))
    }

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.check(FailPoint::InsertVehicle)?;
        if self.working.vehicles.contains_key(&vehicle.chassis_number) {
            return Err(StoreError::unique(constraints::VEHICLES_CHASSIS));
        }
        if self
            .working
            .vehicles
            .values()
            .any(|v| v.engine_number == vehicle.engine_number)
        {
            return Err(StoreError::unique(constraints::VEHICLES_ENGINE));
        }
        self.working
            .vehicles
            .insert(vehicle.chassis_number.clone(), vehicle.clone());
        Ok(())
    }

    async fn insert_registration(&mut self, registration: &NewRegistration) -> Result<i64, StoreError> {
        self.check(FailPoint::InsertRegistration)?;
        if !self.working.owners.contains_key(&registration.owner_id) {
            return Err(StoreError::foreign_key(constraints::REGISTRATIONS_OWNER));
        }
        if !self.working.vehicles.contains_key(&registration.chassis_number) {
            return Err(StoreError::foreign_key(constraints::REGISTRATIONS_CHASSIS));
        }
        if self
            .working
            .registration_by_number(&registration.registration_number)
            .is_some()
        {
            return Err(StoreError::unique(constraints::REGISTRATIONS_NUMBER));
        }

        self.working.next_application_id += 1;
        let application_id = self.working.next_application_id;
        self.working
            .registrations
            .insert(application_id, registration.clone().into_registration(application_id));
        Ok(application_id)
    }

    async fn lock_registration_by_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self.working.registration_by_number(registration_number).cloned())
    }

    async fn lock_registration(&mut self, application_id: i64) -> Result<Option<Registration>, StoreError> {
        Ok(self.working.registrations.get(&application_id).cloned())
    }

    async fn update_valid_until(&mut self, application_id: i64, valid_until: NaiveDate) -> Result<(), StoreError> {
        self.check(FailPoint::UpdateValidUntil)?;
        if let Some(registration) = self.working.registrations.get_mut(&application_id) {
            registration.valid_until = valid_until;
        }
        Ok(())
    }

    async fn update_owner(&mut self, application_id: i64, new_owner_id: i64) -> Result<u64, StoreError> {
        self.check(FailPoint::UpdateOwner)?;
        if !self.working.owners.contains_key(&new_owner_id) {
            return Err(StoreError::foreign_key(constraints::REGISTRATIONS_OWNER));
        }
        match self.working.registrations.get_mut(&application_id) {
            Some(registration) => {
                registration.owner_id = new_owner_id;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError> {
        self.check(FailPoint::InsertInsurance)?;
        self.put_insurance(policy)
    }

    async fn replace_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError> {
        self.check(FailPoint::ReplaceInsurance)?;
        self.working.insurance.remove(&policy.application_id);
        self.put_insurance(policy)
    }

    async fn append_renewal(&mut self, entry: &RenewalHistoryEntry) -> Result<(), StoreError> {
        self.check(FailPoint::AppendRenewal)?;
        if !self.working.registrations.contains_key(&entry.application_id) {
            return Err(StoreError::foreign_key(constraints::RENEWAL_APPLICATION));
        }
        self.working.renewals.push(entry.clone());
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        self.check(FailPoint::InsertPayment)?;
        if self.working.payments.contains_key(&payment.transaction_id) {
            return Err(StoreError::unique(constraints::PAYMENTS_TRANSACTION));
        }
        if !self.working.registrations.contains_key(&payment.application_id) {
            return Err(StoreError::foreign_key(constraints::PAYMENTS_APPLICATION));
        }
        if let Some(owner_id) = payment.new_owner_id {
            if !self.working.owners.contains_key(&owner_id) {
                return Err(StoreError::foreign_key(constraints::PAYMENTS_NEW_OWNER));
            }
        }
        self.working
            .payments
            .insert(payment.transaction_id.clone(), payment.clone());
        Ok(())
    }

    async fn mark_payment_paid(
        &mut self,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, StoreError> {
        self.check(FailPoint::MarkPaymentPaid)?;
        match self.working.payments.get_mut(transaction_id) {
            Some(payment) if payment.payment_status == PaymentStatus::Pending => {
                payment.payment_status = PaymentStatus::Paid;
                payment.payment_date = Some(paid_at);
                Ok(Some(payment.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_learner_licence(&mut self, user_id: i64, classes: &[String]) -> Result<i64, StoreError> {
        if !self.working.owners.contains_key(&user_id) {
            return Err(StoreError::foreign_key(constraints::LEARNER_LICENCES_USER));
        }
        self.working.next_llno += 1;
        let llno = self.working.next_llno;
        self.working.learner_licences.insert(
            llno,
            LearnerLicence {
                llno,
                user_id,
                licence_classes: classes.to_vec(),
                status: LICENCE_STATUS_APPLIED.to_string(),
            },
        );
        Ok(llno)
    }

    async fn learner_licence_held_by(&mut self, llno: i64, user_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .working
            .learner_licences
            .get(&llno)
            .is_some_and(|l| l.user_id == user_id))
    }

    async fn insert_driving_test(&mut self, test: &NewDrivingTest) -> Result<i64, StoreError> {
        if !self.working.learner_licences.contains_key(&test.llno) {
            return Err(StoreError::foreign_key(constraints::DRIVING_TESTS_LICENCE));
        }
        if self.working.driving_tests.values().any(|t| t.llno == test.llno) {
            return Err(StoreError::unique(constraints::DRIVING_TESTS_LLNO));
        }
        self.working.next_test_id += 1;
        let application_id = self.working.next_test_id;
        self.working.driving_tests.insert(
            application_id,
            DrivingTest {
                application_id,
                llno: test.llno,
                user_id: test.user_id,
                test_date: test.test_date,
                time_slot: test.time_slot.clone(),
                status: TEST_STATUS_SCHEDULED.to_string(),
            },
        );
        Ok(application_id)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        self.check(FailPoint::Commit)?;
        *self.committed = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl MemoryUnitOfWork {
    fn put_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError> {
        if self.working.insurance.contains_key(&policy.application_id) {
            return Err(StoreError::unique(constraints::INSURANCE_APPLICATION));
        }
        if self
            .working
            .insurance
            .values()
            .any(|p| p.policy_number == policy.policy_number)
        {
            return Err(StoreError::unique(constraints::INSURANCE_POLICY));
        }
        self.working.insurance.insert(policy.application_id, policy.clone());
        Ok(())
    }
}

//! Capa de persistencia
//!
//! `Store` es el handle inyectado (pool de conexiones) y `UnitOfWork` la
//! transacción abierta sobre una única conexión. Los errores del driver se
//! traducen aquí a `StoreError` tipado; cada flujo decide qué significan.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{
    InsurancePolicy, NewDrivingTest, NewRegistration, Owner, Payment, Registration,
    RenewalHistoryEntry, Vehicle,
};

pub use memory::{FailPoint, MemoryStore};
pub use postgres::PgStore;

/// Nombres de constraints del schema, compartidos por ambos backends
pub mod constraints {
    pub const VEHICLES_CHASSIS: &str = "vehicles_pkey";
    pub const VEHICLES_ENGINE: &str = "vehicles_engine_number_key";
    pub const REGISTRATIONS_NUMBER: &str = "registrations_registration_number_key";
    pub const REGISTRATIONS_OWNER: &str = "registrations_owner_id_fkey";
    pub const REGISTRATIONS_CHASSIS: &str = "registrations_chassis_number_fkey";
    pub const INSURANCE_POLICY: &str = "insurance_policies_pkey";
    pub const INSURANCE_APPLICATION: &str = "insurance_policies_application_id_key";
    pub const PAYMENTS_TRANSACTION: &str = "payments_pkey";
    pub const PAYMENTS_APPLICATION: &str = "payments_application_id_fkey";
    pub const PAYMENTS_NEW_OWNER: &str = "payments_new_owner_id_fkey";
    pub const RENEWAL_APPLICATION: &str = "renewal_history_application_id_fkey";
    pub const LEARNER_LICENCES_USER: &str = "learner_licences_user_id_fkey";
    pub const DRIVING_TESTS_LLNO: &str = "driving_tests_llno_key";
    pub const DRIVING_TESTS_LICENCE: &str = "driving_tests_llno_fkey";
}

/// Errores tipados de la capa de persistencia
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint '{constraint}' violated")]
    ForeignKeyViolation { constraint: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unique(constraint: &str) -> Self {
        StoreError::UniqueViolation { constraint: constraint.to_string() }
    }

    pub fn foreign_key(constraint: &str) -> Self {
        StoreError::ForeignKeyViolation { constraint: constraint.to_string() }
    }

    /// ¿Es una violación de unicidad sobre `constraint`?
    pub fn is_unique(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint: c } if c == constraint)
    }

    /// ¿Es una violación de clave foránea sobre `constraint`?
    pub fn is_foreign_key(&self, constraint: &str) -> bool {
        matches!(self, StoreError::ForeignKeyViolation { constraint: c } if c == constraint)
    }
}

/// Handle de almacenamiento inyectado en cada flujo.
///
/// Las lecturas de aquí usan conexiones del pool en auto-commit; todo lo que
/// escribe pasa por `begin()`.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Adquiere una conexión y abre una transacción sobre ella
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn find_owner(&self, user_id: i64) -> Result<Option<Owner>, StoreError>;

    async fn find_owner_by_government_id(&self, pan_number: &str) -> Result<Option<Owner>, StoreError>;

    async fn find_vehicle(&self, chassis_number: &str) -> Result<Option<Vehicle>, StoreError>;

    async fn find_registration(&self, registration_number: &str) -> Result<Option<Registration>, StoreError>;

    async fn find_insurance(&self, application_id: i64) -> Result<Option<InsurancePolicy>, StoreError>;

    async fn find_payment(&self, transaction_id: &str) -> Result<Option<Payment>, StoreError>;

    async fn renewal_history(&self, application_id: i64) -> Result<Vec<RenewalHistoryEntry>, StoreError>;
}

/// Transacción abierta. Soltarla sin `commit` equivale a `rollback`.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn owner_exists(&mut self, user_id: i64) -> Result<bool, StoreError>;

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError>;

    /// Inserta y devuelve el `application_id` asignado
    async fn insert_registration(&mut self, registration: &NewRegistration) -> Result<i64, StoreError>;

    /// Lectura con bloqueo de fila hasta el fin de la transacción
    async fn lock_registration_by_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError>;

    async fn lock_registration(&mut self, application_id: i64) -> Result<Option<Registration>, StoreError>;

    async fn update_valid_until(&mut self, application_id: i64, valid_until: NaiveDate) -> Result<(), StoreError>;

    /// Devuelve las filas afectadas
    async fn update_owner(&mut self, application_id: i64, new_owner_id: i64) -> Result<u64, StoreError>;

    async fn insert_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError>;

    /// Borra la póliza vigente de la solicitud e inserta la nueva
    async fn replace_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError>;

    async fn append_renewal(&mut self, entry: &RenewalHistoryEntry) -> Result<(), StoreError>;

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    /// `Pending → Paid` condicional; `None` si no había fila pendiente
    async fn mark_payment_paid(
        &mut self,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, StoreError>;

    async fn insert_learner_licence(&mut self, user_id: i64, classes: &[String]) -> Result<i64, StoreError>;

    async fn learner_licence_held_by(&mut self, llno: i64, user_id: i64) -> Result<bool, StoreError>;

    async fn insert_driving_test(&mut self, test: &NewDrivingTest) -> Result<i64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

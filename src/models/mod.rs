//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (ver `migrations/0001_registration_core.sql`).

pub mod insurance;
pub mod licence;
pub mod owner;
pub mod payment;
pub mod registration;
pub mod renewal;
pub mod vehicle;

pub use insurance::{InsuranceDetails, InsurancePolicy};
pub use licence::{DrivingTest, LearnerLicence, NewDrivingTest};
pub use owner::{Owner, OwnerId};
pub use payment::{Payment, PaymentPurpose, PaymentStatus};
pub use registration::{NewRegistration, Registration, RegistrationDetails};
pub use renewal::RenewalHistoryEntry;
pub use vehicle::Vehicle;

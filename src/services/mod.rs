//! Services module
//!
//! Lógica de negocio: los flujos transaccionales de registro, renovación y
//! transferencia, el ledger de pagos y las verificaciones que los protegen.
//! Cada flujo abre su propia transacción con `database::scoped`; el ledger y
//! las verificaciones participan en la del llamador.

pub mod ledger;
pub mod licensing_service;
pub mod registration_workflow;
pub mod renewal_workflow;
pub mod transfer_workflow;
pub mod verification_gate;

pub use ledger::Ledger;
pub use licensing_service::LicensingService;
pub use registration_workflow::{RegistrationReceipt, RegistrationWorkflow};
pub use renewal_workflow::{RenewalOutcome, RenewalWorkflow};
pub use transfer_workflow::{TransferDraft, TransferOutcome, TransferWorkflow};

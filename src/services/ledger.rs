//! Ledger de pagos
//!
//! Las operaciones de escritura (`create_pending_payment`, `mark_paid`) no
//! abren transacción propia: participan en la `UnitOfWork` del flujo que las
//! llama. `Ledger` solo expone las lecturas del pool y la confirmación simple
//! de un pago sin efectos sobre la titularidad.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::scoped;
use crate::models::{Payment, PaymentPurpose};
use crate::repositories::{constraints, Store, UnitOfWork};
use crate::utils::clock::Clock;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::validate_non_negative_amount;

/// Genera un transaction id opaco: prefijo por concepto + UUID v4 (CSPRNG)
pub fn generate_transaction_id(purpose: PaymentPurpose) -> String {
    format!(
        "{}-{}",
        purpose.id_prefix(),
        Uuid::new_v4().simple().to_string().to_uppercase()
    )
}

/// Inserta un pago `Pending` dentro de la transacción del llamador.
///
/// `new_owner_id` solo aplica a transferencias: queda ligado al pago y la
/// fase B no acepta otro comprador.
pub async fn create_pending_payment<U: UnitOfWork>(
    tx: &mut U,
    application_id: i64,
    purpose: PaymentPurpose,
    amount: Decimal,
    new_owner_id: Option<i64>,
) -> AppResult<String> {
    validate_non_negative_amount(&amount).map_err(|_| {
        AppError::ValidationFailed(format!("Payment amount must not be negative, got {}", amount))
    })?;

    let transaction_id = generate_transaction_id(purpose);
    let mut payment = Payment::pending(transaction_id.clone(), application_id, purpose, amount);
    if let Some(owner_id) = new_owner_id {
        payment = payment.for_new_owner(owner_id);
    }

    tx.insert_payment(&payment).await.map_err(|e| {
        if e.is_unique(constraints::PAYMENTS_TRANSACTION) {
            AppError::DuplicateTransaction(format!("Transaction id {} already exists", transaction_id))
        } else if e.is_foreign_key(constraints::PAYMENTS_APPLICATION) {
            AppError::NotFound(format!("Application {} not found", application_id))
        } else if e.is_foreign_key(constraints::PAYMENTS_NEW_OWNER) {
            AppError::NotFound(format!("Owner {} not found", new_owner_id.unwrap_or_default()))
        } else {
            AppError::StorageFailure(e)
        }
    })?;

    info!(
        "🧾 Pago pendiente {} creado para solicitud {} ({}: {})",
        transaction_id,
        application_id,
        purpose.as_str(),
        amount
    );
    Ok(transaction_id)
}

/// `Pending → Paid` dentro de la transacción del llamador.
///
/// "Ya pagado" y "no existe" dan el mismo `PaymentNotFound`.
pub async fn mark_paid<U: UnitOfWork>(
    tx: &mut U,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
) -> AppResult<Payment> {
    match tx.mark_payment_paid(transaction_id, paid_at).await? {
        Some(payment) => {
            info!("💰 Pago {} marcado como pagado", transaction_id);
            Ok(payment)
        }
        None => {
            warn!("🚫 Pago {} no encontrado o ya procesado", transaction_id);
            Err(AppError::PaymentNotFound(format!(
                "Payment record {} not found or already paid",
                transaction_id
            )))
        }
    }
}

pub struct Ledger<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: Store> Ledger<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn get_payment(&self, transaction_id: &str) -> AppResult<Payment> {
        self.store
            .find_payment(transaction_id)
            .await?
            .ok_or_else(|| not_found_error("Payment record", transaction_id))
    }

    /// Confirmación simple de un pago, sin efectos sobre la titularidad
    pub async fn complete_payment(&self, transaction_id: &str) -> AppResult<Payment> {
        let transaction_id = transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            return Err(validation_error("Transaction id is required"));
        }
        let paid_at = self.clock.now();

        scoped(&self.store, "payment", move |tx| {
            Box::pin(async move { mark_paid(tx, &transaction_id, paid_at).await })
        })
        .await
    }
}

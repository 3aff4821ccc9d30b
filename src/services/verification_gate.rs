//! Verificaciones previas a cualquier escritura
//!
//! Funciones puras (o de solo lectura dentro de la transacción) que los flujos
//! ejecutan antes de mutar nada. Un `Err` aquí provoca rollback.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{OwnerId, Registration};
use crate::repositories::UnitOfWork;
use crate::utils::errors::{AppError, AppResult};

/// El solicitante debe ser el titular actual del registro
pub fn assert_ownership(registration: &Registration, claimed: &OwnerId) -> AppResult<()> {
    if claimed.matches(registration.owner_id) {
        return Ok(());
    }
    warn!(
        "🔒 Usuario {} no es titular del registro {}",
        claimed, registration.registration_number
    );
    Err(AppError::AuthorizationDenied(format!(
        "You are not the registered owner of vehicle {}",
        registration.registration_number
    )))
}

/// Solo se renueva un registro ya vencido (`valid_until < today`)
pub fn assert_renewal_due(valid_until: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if valid_until >= today {
        return Err(AppError::RenewalNotDue { valid_until });
    }
    Ok(())
}

/// La licencia de aprendiz `llno` debe pertenecer a `holder`
pub async fn assert_credential_belongs_to_holder<U: UnitOfWork>(
    tx: &mut U,
    llno: i64,
    holder: &OwnerId,
) -> AppResult<()> {
    let holder_id = holder.to_db_id()?;
    if tx.learner_licence_held_by(llno, holder_id).await? {
        return Ok(());
    }
    warn!("🪪 LLN {} no corresponde al usuario {}", llno, holder);
    Err(AppError::CredentialMismatch(format!(
        "Learner licence {} does not match user {}",
        llno, holder
    )))
}

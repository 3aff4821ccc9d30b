//! Transacción con alcance
//!
//! Único punto donde se abre, confirma o revierte una transacción. El trabajo
//! recibe la `UnitOfWork` prestada; si devuelve `Err` (o el commit falla) se
//! hace rollback y la conexión vuelve al pool en cualquier caso.

use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};

use crate::repositories::{Store, UnitOfWork};
use crate::utils::errors::{AppError, AppResult};

/// Ejecuta `work` dentro de una transacción de `store`.
///
/// ```ignore
/// scoped(&store, "renewal", move |tx| Box::pin(async move {
///     tx.update_valid_until(id, date).await?;
///     Ok(())
/// })).await
/// ```
pub async fn scoped<S, T, F>(store: &S, operation: &'static str, work: F) -> AppResult<T>
where
    S: Store,
    T: Send,
    F: for<'t> FnOnce(&'t mut S::Tx) -> BoxFuture<'t, AppResult<T>> + Send,
{
    let mut tx = store.begin().await.map_err(|e| {
        error!("❌ [{}] No se pudo abrir la transacción: {}", operation, e);
        AppError::StorageFailure(e)
    })?;
    debug!("🔓 [{}] Transacción abierta", operation);

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await.map_err(|e| {
                error!("❌ [{}] Commit fallido: {}", operation, e);
                AppError::StorageFailure(e)
            })?;
            info!("✅ [{}] Transacción confirmada", operation);
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("❌ [{}] Rollback fallido: {}", operation, rollback_err);
            }
            warn!("↩️ [{}] Transacción revertida: {}", operation, err);
            Err(err)
        }
    }
}

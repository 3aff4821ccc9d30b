//! Licencia de aprendiz y examen de conducir

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::database::scoped;
use crate::models::{NewDrivingTest, OwnerId};
use crate::repositories::{constraints, Store, UnitOfWork};
use crate::services::verification_gate::assert_credential_belongs_to_holder;
use crate::utils::clock::Clock;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub struct LicensingService<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: Store> LicensingService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Solicitud de licencia de aprendiz; devuelve el LLN asignado
    pub async fn apply(&self, user: &OwnerId, classes: &[String]) -> AppResult<i64> {
        let user_id = user.to_db_id()?;
        let classes = normalize_classes(classes);
        if classes.is_empty() {
            return Err(AppError::ValidationFailed(
                "At least one licence class is required".to_string(),
            ));
        }

        let llno = scoped(&self.store, "learner-licence", move |tx| {
            Box::pin(async move {
                tx.insert_learner_licence(user_id, &classes).await.map_err(|e| {
                    if e.is_foreign_key(constraints::LEARNER_LICENCES_USER) {
                        AppError::NotFound(format!("User {} not found", user_id))
                    } else {
                        AppError::StorageFailure(e)
                    }
                })
            })
        })
        .await?;

        info!("🪪 Licencia de aprendiz {} emitida para usuario {}", llno, user_id);
        Ok(llno)
    }

    /// Comprueba que el LLN pertenece al usuario
    pub async fn verify(&self, llno: i64, user: &OwnerId) -> AppResult<()> {
        let user = user.clone();
        scoped(&self.store, "verify-lln", move |tx| {
            Box::pin(async move { assert_credential_belongs_to_holder(tx, llno, &user).await })
        })
        .await
    }

    /// Reserva el examen de conducir; un examen activo por LLN
    pub async fn schedule_test(
        &self,
        user: &OwnerId,
        llno: i64,
        test_date: NaiveDate,
        time_slot: &str,
    ) -> AppResult<i64> {
        let user_id = user.to_db_id()?;
        let time_slot = time_slot.trim().to_string();
        if time_slot.is_empty() {
            return Err(validation_error("Time slot is required"));
        }
        if test_date < self.clock.today() {
            return Err(AppError::ValidationFailed(format!(
                "Test date {} is in the past",
                test_date
            )));
        }

        let user = user.clone();
        let test = NewDrivingTest {
            llno,
            user_id,
            test_date,
            time_slot,
        };

        let application_id = scoped(&self.store, "driving-test", move |tx| {
            Box::pin(async move {
                assert_credential_belongs_to_holder(tx, llno, &user).await?;
                tx.insert_driving_test(&test).await.map_err(|e| {
                    if e.is_unique(constraints::DRIVING_TESTS_LLNO) {
                        AppError::DuplicateAsset(format!(
                            "A driving test is already scheduled for learner licence {}",
                            llno
                        ))
                    } else if e.is_foreign_key(constraints::DRIVING_TESTS_LICENCE) {
                        AppError::CredentialMismatch(format!("Learner licence {} not found", llno))
                    } else {
                        AppError::StorageFailure(e)
                    }
                })
            })
        })
        .await?;

        info!(
            "📅 Examen {} reservado para LLN {} el {}",
            application_id, llno, test_date
        );
        Ok(application_id)
    }
}

/// Clases en mayúsculas, sin vacíos ni repetidas, en el orden recibido
fn normalize_classes(classes: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(classes.len());
    for class in classes {
        let class = class.trim().to_uppercase();
        if !class.is_empty() && !normalized.contains(&class) {
            normalized.push(class);
        }
    }
    normalized
}

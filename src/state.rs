//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Los flujos se construyen por request a
//! partir del handle de almacenamiento inyectado aquí.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Store;
use crate::services::{Ledger, LicensingService, RegistrationWorkflow, RenewalWorkflow, TransferWorkflow};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState<S: Store> {
    pub store: S,
    pub config: EnvironmentConfig,
    pub clock: Arc<dyn Clock>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, config: EnvironmentConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, config: EnvironmentConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, config, clock }
    }

    pub fn ledger(&self) -> Ledger<S> {
        Ledger::new(self.store.clone(), self.clock.clone())
    }

    pub fn registrations(&self) -> RegistrationWorkflow<S> {
        RegistrationWorkflow::new(self.store.clone(), self.clock.clone(), self.config.fees)
    }

    pub fn renewals(&self) -> RenewalWorkflow<S> {
        RenewalWorkflow::new(self.store.clone(), self.clock.clone())
    }

    pub fn transfers(&self) -> TransferWorkflow<S> {
        TransferWorkflow::new(self.store.clone(), self.clock.clone(), self.config.fees.transfer_fee)
    }

    pub fn licensing(&self) -> LicensingService<S> {
        LicensingService::new(self.store.clone(), self.clock.clone())
    }
}

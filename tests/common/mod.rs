//! Fixtures compartidos por los tests de integración

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use vehicle_registry::config::FeeSchedule;
use vehicle_registry::models::{InsuranceDetails, Owner, OwnerId, RegistrationDetails, Vehicle};
use vehicle_registry::repositories::MemoryStore;
use vehicle_registry::services::{RegistrationReceipt, RegistrationWorkflow};
use vehicle_registry::utils::clock::{Clock, FixedClock};

pub const SELLER: i64 = 1;
pub const BUYER: i64 = 2;
pub const STRANGER: i64 = 3;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn clock_on(day: NaiveDate) -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(day))
}

pub fn owner(user_id: i64, pan: &str) -> Owner {
    Owner {
        user_id,
        full_name: format!("Owner {}", user_id),
        pan_number: pan.to_string(),
        email: Some(format!("owner{}@example.in", user_id)),
        address_line1: None,
        city: Some("Pune".to_string()),
        state: Some("Maharashtra".to_string()),
        pincode: Some("411001".to_string()),
    }
}

/// Almacén con tres usuarios dados de alta
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_owner(owner(SELLER, "ABCDE1234F")).await;
    store.insert_owner(owner(BUYER, "PQRSX5678K")).await;
    store.insert_owner(owner(STRANGER, "LMNOP9012Z")).await;
    store
}

pub fn vehicle(chassis: &str, engine: &str) -> Vehicle {
    Vehicle {
        chassis_number: chassis.to_string(),
        engine_number: engine.to_string(),
        model: "Nexon EV".to_string(),
        vehicle_class: "LMV".to_string(),
        fuel_type: "Electric".to_string(),
    }
}

pub fn details(purchase_date: NaiveDate) -> RegistrationDetails {
    RegistrationDetails {
        dealer_name: "Sai Motors".to_string(),
        purchase_date,
        ex_showroom_price: Decimal::new(850_000, 0),
        rto_office_code: "MH-12".to_string(),
    }
}

pub fn insurance(policy_number: &str, start: NaiveDate) -> InsuranceDetails {
    InsuranceDetails {
        policy_number: policy_number.to_string(),
        company_name: "New India Assurance".to_string(),
        policy_type: "Comprehensive".to_string(),
        start_date: start,
        end_date: start + chrono::Duration::days(365),
    }
}

/// Alta de un vehículo comprado el 1995-01-01 (válido hasta 2010-01-01)
pub async fn register_legacy_vehicle(store: &MemoryStore, owner_id: i64) -> RegistrationReceipt {
    let purchase = date(1995, 1, 1);
    RegistrationWorkflow::new(store.clone(), clock_on(purchase), FeeSchedule::default())
        .submit(
            &OwnerId::from(owner_id),
            vehicle("MA3EWDE1S00123456", "K12MN1234567"),
            details(purchase),
            insurance("POL-1995-001", purchase),
        )
        .await
        .unwrap()
}

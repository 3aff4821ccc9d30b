mod common;

use rust_decimal::Decimal;

use common::*;
use vehicle_registry::config::FeeSchedule;
use vehicle_registry::models::{OwnerId, PaymentPurpose, PaymentStatus};
use vehicle_registry::repositories::{constraints, FailPoint, MemoryStore, Store, StoreError};
use vehicle_registry::services::{
    Ledger, LicensingService, RegistrationWorkflow, RenewalWorkflow, TransferWorkflow,
};
use vehicle_registry::utils::errors::AppError;

fn registrations(store: &MemoryStore) -> RegistrationWorkflow<MemoryStore> {
    RegistrationWorkflow::new(store.clone(), clock_on(date(2024, 3, 1)), FeeSchedule::default())
}

fn transfers(store: &MemoryStore) -> TransferWorkflow<MemoryStore> {
    TransferWorkflow::new(
        store.clone(),
        clock_on(date(2024, 6, 1)),
        FeeSchedule::default().transfer_fee,
    )
}

// ---------------------------------------------------------------------------
// Alta de registro
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_registration_creates_linked_records() {
    let store = seeded_store().await;
    let receipt = registrations(&store)
        .submit(
            &OwnerId::from(SELLER),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-001", date(2024, 3, 1)),
        )
        .await
        .unwrap();

    assert!(receipt.registration_number.starts_with("MH-12-T"));
    assert!(receipt.transaction_id.starts_with("TXN-REG-"));
    assert_eq!(receipt.road_tax_amount, Decimal::new(68_000, 0));

    let tables = store.snapshot().await;
    assert_eq!(tables.vehicles.len(), 1);
    assert_eq!(tables.registrations.len(), 1);
    assert_eq!(tables.insurance.len(), 1);
    assert_eq!(tables.payments.len(), 1);

    let registration = &tables.registrations[&receipt.application_id];
    assert_eq!(registration.owner_id, SELLER);
    assert_eq!(registration.application_status, "Submitted");
    assert_eq!(registration.valid_until, date(2039, 3, 1));

    let policy = &tables.insurance[&receipt.application_id];
    assert_eq!(policy.policy_number, "POL-2024-001");

    let payment = &tables.payments[&receipt.transaction_id];
    assert_eq!(payment.application_id, receipt.application_id);
    assert_eq!(payment.payment_for, PaymentPurpose::NewRegistration);
    assert_eq!(payment.payment_status, PaymentStatus::Pending);
    assert_eq!(payment.amount, receipt.road_tax_amount);
    assert!(payment.payment_date.is_none());
}

#[tokio::test]
async fn test_registration_failure_at_any_write_persists_nothing() {
    for point in [
        FailPoint::InsertVehicle,
        FailPoint::InsertRegistration,
        FailPoint::InsertInsurance,
        FailPoint::InsertPayment,
        FailPoint::Commit,
    ] {
        let store = seeded_store().await;
        store.fail_on(point);

        let result = registrations(&store)
            .submit(
                &OwnerId::from(SELLER),
                vehicle("MA3EWDE1S00999999", "K12MN9999999"),
                details(date(2024, 3, 1)),
                insurance("POL-2024-001", date(2024, 3, 1)),
            )
            .await;

        assert!(
            matches!(result, Err(AppError::StorageFailure(_))),
            "{:?} should surface a storage failure",
            point
        );

        let tables = store.snapshot().await;
        assert!(tables.vehicles.is_empty(), "{:?} left a vehicle behind", point);
        assert!(tables.registrations.is_empty(), "{:?} left a registration behind", point);
        assert!(tables.insurance.is_empty(), "{:?} left a policy behind", point);
        assert!(tables.payments.is_empty(), "{:?} left a payment behind", point);
    }
}

#[tokio::test]
async fn test_transaction_id_collision_rolls_back_registration() {
    let store = seeded_store().await;
    store.fail_with(
        FailPoint::InsertPayment,
        StoreError::unique(constraints::PAYMENTS_TRANSACTION),
    );

    let result = registrations(&store)
        .submit(
            &OwnerId::from(SELLER),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-001", date(2024, 3, 1)),
        )
        .await;
    assert!(matches!(result, Err(AppError::DuplicateTransaction(_))));

    let tables = store.snapshot().await;
    assert!(tables.vehicles.is_empty());
    assert!(tables.registrations.is_empty());
    assert!(tables.insurance.is_empty());
    assert!(tables.payments.is_empty());
}

#[tokio::test]
async fn test_registration_number_collision_is_duplicate_asset() {
    let store = seeded_store().await;
    store.fail_with(
        FailPoint::InsertRegistration,
        StoreError::unique(constraints::REGISTRATIONS_NUMBER),
    );

    let result = registrations(&store)
        .submit(
            &OwnerId::from(SELLER),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-001", date(2024, 3, 1)),
        )
        .await;
    assert!(matches!(result, Err(AppError::DuplicateAsset(_))));
    assert!(store.snapshot().await.vehicles.is_empty());
}

#[tokio::test]
async fn test_registration_date_is_purchase_date() {
    let store = seeded_store().await;
    let receipt = registrations(&store)
        .submit(
            &OwnerId::from(SELLER),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            details(date(2024, 2, 10)),
            insurance("POL-2024-001", date(2024, 2, 10)),
        )
        .await
        .unwrap();

    let registration = &store.snapshot().await.registrations[&receipt.application_id];
    assert_eq!(registration.registration_date, date(2024, 2, 10));
    assert_eq!(registration.application_date, date(2024, 3, 1));
}

#[tokio::test]
async fn test_registration_rejects_duplicate_assets() {
    let store = seeded_store().await;
    register_legacy_vehicle(&store, SELLER).await;
    let workflow = registrations(&store);

    let same_chassis = workflow
        .submit(
            &OwnerId::from(BUYER),
            vehicle("MA3EWDE1S00123456", "K12MN0000001"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-002", date(2024, 3, 1)),
        )
        .await;
    assert!(matches!(same_chassis, Err(AppError::DuplicateAsset(_))));

    let same_engine = workflow
        .submit(
            &OwnerId::from(BUYER),
            vehicle("MA3EWDE1S00000002", "K12MN1234567"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-003", date(2024, 3, 1)),
        )
        .await;
    assert!(matches!(same_engine, Err(AppError::DuplicateAsset(_))));

    let same_policy = workflow
        .submit(
            &OwnerId::from(BUYER),
            vehicle("MA3EWDE1S00000003", "K12MN0000003"),
            details(date(2024, 3, 1)),
            insurance("POL-1995-001", date(2024, 3, 1)),
        )
        .await;
    assert!(matches!(same_policy, Err(AppError::DuplicateAsset(_))));

    let tables = store.snapshot().await;
    assert_eq!(tables.vehicles.len(), 1);
    assert_eq!(tables.payments.len(), 1);
}

#[tokio::test]
async fn test_registration_for_unknown_owner_is_not_found() {
    let store = seeded_store().await;
    let result = registrations(&store)
        .submit(
            &OwnerId::from(404),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            details(date(2024, 3, 1)),
            insurance("POL-2024-001", date(2024, 3, 1)),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(store.snapshot().await.vehicles.is_empty());
}

#[tokio::test]
async fn test_registration_validation_happens_before_storage() {
    let store = seeded_store().await;
    store.fail_on(FailPoint::InsertVehicle);

    let mut bad_details = details(date(2024, 3, 1));
    bad_details.dealer_name = "   ".to_string();

    let result = registrations(&store)
        .submit(
            &OwnerId::from(SELLER),
            vehicle("MA3EWDE1S00999999", "K12MN9999999"),
            bad_details,
            insurance("POL-2024-001", date(2024, 3, 1)),
        )
        .await;

    // El fallo inyectado nunca se alcanza
    assert!(matches!(result, Err(AppError::ValidationFailed(_))));
}

// ---------------------------------------------------------------------------
// Renovación
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_renewal_extends_from_previous_expiry() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    let outcome = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)))
        .renew(
            &OwnerId::from(SELLER),
            &receipt.registration_number,
            insurance("POL-2024-REN", date(2024, 6, 1)),
        )
        .await
        .unwrap();

    assert_eq!(outcome.old_valid_until, date(2010, 1, 1));
    // Desde el vencimiento anterior, nunca desde hoy
    assert_eq!(outcome.new_valid_until, date(2025, 1, 1));

    let registration = store
        .find_registration(&receipt.registration_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registration.valid_until, date(2025, 1, 1));

    let policy = store.find_insurance(receipt.application_id).await.unwrap().unwrap();
    assert_eq!(policy.policy_number, "POL-2024-REN");
    assert_eq!(store.snapshot().await.insurance.len(), 1);

    let history = store.renewal_history(receipt.application_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].renewal_date, date(2024, 6, 1));
    assert_eq!(history[0].old_valid_until, date(2010, 1, 1));
    assert_eq!(history[0].new_valid_until, date(2025, 1, 1));
    assert_eq!(history[0].new_policy_number, "POL-2024-REN");
}

#[tokio::test]
async fn test_renewal_before_expiry_is_rejected_without_changes() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let before = store.snapshot().await;

    for today in [date(2009, 12, 31), date(2010, 1, 1)] {
        let result = RenewalWorkflow::new(store.clone(), clock_on(today))
            .renew(
                &OwnerId::from(SELLER),
                &receipt.registration_number,
                insurance("POL-EARLY", today),
            )
            .await;

        match result {
            Err(err @ AppError::RenewalNotDue { .. }) => {
                assert!(err.to_string().contains("Fri Jan 01 2010"));
            }
            other => panic!("expected RenewalNotDue, got {:?}", other),
        }
    }

    let after = store.snapshot().await;
    assert_eq!(after.registrations, before.registrations);
    assert_eq!(after.insurance, before.insurance);
    assert!(after.renewals.is_empty());
}

#[tokio::test]
async fn test_renewal_by_non_owner_is_denied() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    let result = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)))
        .renew(
            &OwnerId::from(STRANGER),
            &receipt.registration_number,
            insurance("POL-2024-REN", date(2024, 6, 1)),
        )
        .await;

    assert!(matches!(result, Err(AppError::AuthorizationDenied(_))));
    assert!(store.snapshot().await.renewals.is_empty());
}

#[tokio::test]
async fn test_renewal_of_unknown_registration_is_not_found() {
    let store = seeded_store().await;
    let result = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)))
        .renew(
            &OwnerId::from(SELLER),
            "MH-12-T0000000000",
            insurance("POL-2024-REN", date(2024, 6, 1)),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_renewal_failure_keeps_old_validity_and_policy() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    for point in [FailPoint::UpdateValidUntil, FailPoint::ReplaceInsurance, FailPoint::AppendRenewal] {
        store.fail_on(point);
        let result = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)))
            .renew(
                &OwnerId::from(SELLER),
                &receipt.registration_number,
                insurance("POL-2024-REN", date(2024, 6, 1)),
            )
            .await;
        store.clear_failure();

        assert!(matches!(result, Err(AppError::StorageFailure(_))));
        let tables = store.snapshot().await;
        assert_eq!(tables.registrations[&receipt.application_id].valid_until, date(2010, 1, 1));
        assert_eq!(tables.insurance[&receipt.application_id].policy_number, "POL-1995-001");
        assert!(tables.renewals.is_empty());
    }
}

#[tokio::test]
async fn test_concurrent_renewals_only_one_commits() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    let first = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)));
    let second = RenewalWorkflow::new(store.clone(), clock_on(date(2024, 6, 1)));
    let owner = OwnerId::from(SELLER);

    let (a, b) = tokio::join!(
        first.renew(&owner, &receipt.registration_number, insurance("POL-A", date(2024, 6, 1))),
        second.renew(&owner, &receipt.registration_number, insurance("POL-B", date(2024, 6, 1))),
    );

    let results = [a, b];
    let committed = results.iter().filter(|r| r.is_ok()).count();
    let not_due = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::RenewalNotDue { .. })))
        .count();
    assert_eq!(committed, 1);
    assert_eq!(not_due, 1);

    let history = store.renewal_history(receipt.application_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        store
            .find_registration(&receipt.registration_number)
            .await
            .unwrap()
            .unwrap()
            .valid_until,
        date(2025, 1, 1)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renewals_on_worker_threads() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            let number = receipt.registration_number.clone();
            tokio::spawn(async move {
                RenewalWorkflow::new(store, clock_on(date(2024, 6, 1)))
                    .renew(
                        &OwnerId::from(SELLER),
                        &number,
                        insurance(&format!("POL-T{}", i), date(2024, 6, 1)),
                    )
                    .await
            })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(AppError::RenewalNotDue { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(committed, 1);
}

// ---------------------------------------------------------------------------
// Transferencia
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_transfer_happy_path() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);

    let draft = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await
        .unwrap();
    assert!(draft.transaction_id.starts_with("TXN-TNSF-"));
    assert_eq!(draft.amount, Decimal::new(50_000, 2));
    assert_eq!(draft.new_owner_id, BUYER);

    let pending = store.find_payment(&draft.transaction_id).await.unwrap().unwrap();
    assert_eq!(pending.payment_status, PaymentStatus::Pending);
    assert_eq!(pending.payment_for, PaymentPurpose::OwnershipTransfer);

    let outcome = workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
        .await
        .unwrap();
    assert_eq!(outcome.previous_owner_id, SELLER);
    assert_eq!(outcome.new_owner_id, BUYER);

    let registration = store
        .find_registration(&receipt.registration_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registration.owner_id, BUYER);

    let paid = store.find_payment(&draft.transaction_id).await.unwrap().unwrap();
    assert!(paid.is_paid());
    assert!(paid.payment_date.is_some());
}

#[tokio::test]
async fn test_draft_transfer_rejections_create_no_payment() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);

    let not_owner = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(STRANGER), &OwnerId::from(BUYER))
        .await;
    assert!(matches!(not_owner, Err(AppError::AuthorizationDenied(_))));

    let same_owner = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(SELLER))
        .await;
    assert!(matches!(same_owner, Err(AppError::ValidationFailed(_))));

    let unknown_buyer = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(404))
        .await;
    assert!(matches!(unknown_buyer, Err(AppError::NotFound(_))));

    let unknown_application = workflow
        .draft_transfer(9_999, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await;
    assert!(matches!(unknown_application, Err(AppError::NotFound(_))));

    // Solo queda el pago del alta
    assert_eq!(store.snapshot().await.payments.len(), 1);
}

#[tokio::test]
async fn test_complete_transfer_is_atomic_under_failure() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);
    let draft = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await
        .unwrap();

    for point in [FailPoint::MarkPaymentPaid, FailPoint::UpdateOwner, FailPoint::Commit] {
        store.fail_on(point);
        let result = workflow
            .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
            .await;
        store.clear_failure();

        assert!(matches!(result, Err(AppError::StorageFailure(_))), "{:?}", point);

        // Ni pagado con titular intacto, ni titular cambiado con pago pendiente
        let tables = store.snapshot().await;
        assert_eq!(tables.payments[&draft.transaction_id].payment_status, PaymentStatus::Pending);
        assert_eq!(tables.registrations[&receipt.application_id].owner_id, SELLER);
    }

    // El mismo pago sigue siendo completable tras los fallos
    workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_complete_transfer_unknown_registration_rolls_back_payment() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);
    let draft = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await
        .unwrap();

    let result = workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), "KA-05-T0000000000")
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let payment = store.find_payment(&draft.transaction_id).await.unwrap().unwrap();
    assert_eq!(payment.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_complete_transfer_rejects_registration_payment() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;

    let result = transfers(&store)
        .complete_transfer(&receipt.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
        .await;
    assert!(matches!(result, Err(AppError::ValidationFailed(_))));

    let tables = store.snapshot().await;
    assert_eq!(tables.payments[&receipt.transaction_id].payment_status, PaymentStatus::Pending);
    assert_eq!(tables.registrations[&receipt.application_id].owner_id, SELLER);
}

#[tokio::test]
async fn test_complete_transfer_only_to_drafted_buyer() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);
    let draft = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await
        .unwrap();
    assert_eq!(
        store.snapshot().await.payments[&draft.transaction_id].new_owner_id,
        Some(BUYER)
    );

    let hijack = workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(STRANGER), &receipt.registration_number)
        .await;
    assert!(matches!(hijack, Err(AppError::AuthorizationDenied(_))));

    let tables = store.snapshot().await;
    assert_eq!(tables.payments[&draft.transaction_id].payment_status, PaymentStatus::Pending);
    assert_eq!(tables.registrations[&receipt.application_id].owner_id, SELLER);

    // El comprador aprobado sigue pudiendo completar
    let outcome = workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
        .await
        .unwrap();
    assert_eq!(outcome.new_owner_id, BUYER);
}

#[tokio::test]
async fn test_draft_transfer_id_collision_is_duplicate_transaction() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    store.fail_with(
        FailPoint::InsertPayment,
        StoreError::unique(constraints::PAYMENTS_TRANSACTION),
    );

    let result = transfers(&store)
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await;
    assert!(matches!(result, Err(AppError::DuplicateTransaction(_))));

    let tables = store.snapshot().await;
    assert_eq!(tables.payments.len(), 1);
    assert!(tables.payments.contains_key(&receipt.transaction_id));
}

#[tokio::test]
async fn test_replayed_completion_is_rejected() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let workflow = transfers(&store);
    let draft = workflow
        .draft_transfer(receipt.application_id, &OwnerId::from(SELLER), &OwnerId::from(BUYER))
        .await
        .unwrap();

    workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(BUYER), &receipt.registration_number)
        .await
        .unwrap();

    let replay = workflow
        .complete_transfer(&draft.transaction_id, &OwnerId::from(STRANGER), &receipt.registration_number)
        .await;
    assert!(matches!(replay, Err(AppError::PaymentNotFound(_))));

    let registration = store
        .find_registration(&receipt.registration_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registration.owner_id, BUYER);
}

#[tokio::test]
async fn test_find_buyer_by_pan() {
    let store = seeded_store().await;
    let workflow = transfers(&store);

    let buyer = workflow.find_buyer(" pqrsx5678k ").await.unwrap();
    assert_eq!(buyer.user_id, BUYER);
    assert!(matches!(workflow.find_buyer("ZZZZZ0000Z").await, Err(AppError::NotFound(_))));

    let seller = workflow.find_owner(&OwnerId::from("1")).await.unwrap();
    assert_eq!(seller.pan_number, "ABCDE1234F");
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_second_mark_paid_is_payment_not_found() {
    let store = seeded_store().await;
    let receipt = register_legacy_vehicle(&store, SELLER).await;
    let ledger = Ledger::new(store.clone(), clock_on(date(1995, 1, 2)));

    let paid = ledger.complete_payment(&receipt.transaction_id).await.unwrap();
    assert!(paid.is_paid());
    let first_date = paid.payment_date;

    let again = ledger.complete_payment(&receipt.transaction_id).await;
    assert!(matches!(again, Err(AppError::PaymentNotFound(_))));

    let stored = ledger.get_payment(&receipt.transaction_id).await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.payment_date, first_date);
}

#[tokio::test]
async fn test_unknown_payment() {
    let store = seeded_store().await;
    let ledger = Ledger::new(store, clock_on(date(2024, 6, 1)));

    assert!(matches!(ledger.get_payment("TXN-REG-NOPE").await, Err(AppError::NotFound(_))));
    assert!(matches!(
        ledger.complete_payment("TXN-REG-NOPE").await,
        Err(AppError::PaymentNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Licencias
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_learner_licence_and_driving_test() {
    let store = seeded_store().await;
    let service = LicensingService::new(store.clone(), clock_on(date(2024, 6, 1)));
    let user = OwnerId::from(SELLER);

    let llno = service
        .apply(&user, &["LMV".to_string(), "mcwg".to_string()])
        .await
        .unwrap();
    assert_eq!(store.snapshot().await.learner_licences[&llno].licence_classes, vec!["LMV", "MCWG"]);

    service.verify(llno, &user).await.unwrap();
    assert!(matches!(
        service.verify(llno, &OwnerId::from(BUYER)).await,
        Err(AppError::CredentialMismatch(_))
    ));

    let test_id = service
        .schedule_test(&user, llno, date(2024, 7, 15), "10:00-10:30")
        .await
        .unwrap();
    assert_eq!(store.snapshot().await.driving_tests[&test_id].llno, llno);

    let again = service.schedule_test(&user, llno, date(2024, 7, 16), "11:00-11:30").await;
    assert!(matches!(again, Err(AppError::DuplicateAsset(_))));
}

#[tokio::test]
async fn test_licensing_rejections() {
    let store = seeded_store().await;
    let service = LicensingService::new(store.clone(), clock_on(date(2024, 6, 1)));

    assert!(matches!(
        service.apply(&OwnerId::from(SELLER), &[]).await,
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        service.apply(&OwnerId::from(404), &["LMV".to_string()]).await,
        Err(AppError::NotFound(_))
    ));

    let llno = service.apply(&OwnerId::from(SELLER), &["LMV".to_string()]).await.unwrap();

    let past = service
        .schedule_test(&OwnerId::from(SELLER), llno, date(2024, 5, 31), "10:00-10:30")
        .await;
    assert!(matches!(past, Err(AppError::ValidationFailed(_))));

    let someone_else = service
        .schedule_test(&OwnerId::from(BUYER), llno, date(2024, 7, 1), "10:00-10:30")
        .await;
    assert!(matches!(someone_else, Err(AppError::CredentialMismatch(_))));

    assert!(store.snapshot().await.driving_tests.is_empty());
}

//! Backend PostgreSQL (sqlx)
//!
//! Cada `PgUnitOfWork` retiene una conexión del pool durante toda la
//! transacción. Si se suelta sin `commit`, sqlx hace rollback y devuelve la
//! conexión al pool.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{Store, StoreError, UnitOfWork};
use crate::models::{
    licence::{LICENCE_STATUS_APPLIED, TEST_STATUS_SCHEDULED},
    InsurancePolicy, NewDrivingTest, NewRegistration, Owner, Payment, PaymentStatus, Registration,
    RenewalHistoryEntry, Vehicle,
};

const POSTGRES_UNIQUE_VIOLATION: &str = "23505";
const POSTGRES_FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some(POSTGRES_UNIQUE_VIOLATION) => return StoreError::UniqueViolation { constraint },
                Some(POSTGRES_FOREIGN_KEY_VIOLATION) => {
                    return StoreError::ForeignKeyViolation { constraint }
                }
                _ => {}
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    async fn find_owner(&self, user_id: i64) -> Result<Option<Owner>, StoreError> {
        let owner = sqlx::query_as::<_, Owner>(
            "SELECT user_id, full_name, pan_number, email, address_line1, city, state, pincode FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn find_owner_by_government_id(&self, pan_number: &str) -> Result<Option<Owner>, StoreError> {
        let owner = sqlx::query_as::<_, Owner>(
            "SELECT user_id, full_name, pan_number, email, address_line1, city, state, pincode FROM users WHERE pan_number = $1",
        )
        .bind(pan_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn find_vehicle(&self, chassis_number: &str) -> Result<Option<Vehicle>, StoreError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE chassis_number = $1")
            .bind(chassis_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn find_registration(&self, registration_number: &str) -> Result<Option<Registration>, StoreError> {
        let registration =
            sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE registration_number = $1")
                .bind(registration_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(registration)
    }

    async fn find_insurance(&self, application_id: i64) -> Result<Option<InsurancePolicy>, StoreError> {
        let policy =
            sqlx::query_as::<_, InsurancePolicy>("SELECT * FROM insurance_policies WHERE application_id = $1")
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(policy)
    }

    async fn find_payment(&self, transaction_id: &str) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT transaction_id, application_id, payment_for, amount, payment_status, payment_date, new_owner_id FROM payments WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn renewal_history(&self, application_id: i64) -> Result<Vec<RenewalHistoryEntry>, StoreError> {
        let entries = sqlx::query_as::<_, RenewalHistoryEntry>(
            r#"
            SELECT application_id, renewal_date, old_valid_until, new_valid_until, new_policy_number
            FROM renewal_history
            WHERE application_id = $1
            ORDER BY renewal_id ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn owner_exists(&mut self, user_id: i64) -> Result<bool, StoreError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(result.0)
    }

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (chassis_number, engine_number, model, vehicle_class, fuel_type)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&vehicle.chassis_number)
        .bind(&vehicle.engine_number)
        .bind(&vehicle.model)
        .bind(&vehicle.vehicle_class)
        .bind(&vehicle.fuel_type)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_registration(&mut self, registration: &NewRegistration) -> Result<i64, StoreError> {
        let (application_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO registrations (
                owner_id, chassis_number, registration_number, rto_office_code,
                application_status, application_date, dealer_name, purchase_date,
                ex_showroom_price, road_tax_amount, registration_date, valid_until
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING application_id
            "#,
        )
        .bind(registration.owner_id)
        .bind(&registration.chassis_number)
        .bind(&registration.registration_number)
        .bind(&registration.rto_office_code)
        .bind(&registration.application_status)
        .bind(registration.application_date)
        .bind(&registration.dealer_name)
        .bind(registration.purchase_date)
        .bind(registration.ex_showroom_price)
        .bind(registration.road_tax_amount)
        .bind(registration.registration_date)
        .bind(registration.valid_until)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(application_id)
    }

    async fn lock_registration_by_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE registration_number = $1 FOR UPDATE",
        )
        .bind(registration_number)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(registration)
    }

    async fn lock_registration(&mut self, application_id: i64) -> Result<Option<Registration>, StoreError> {
        let registration =
            sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE application_id = $1 FOR UPDATE")
                .bind(application_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(registration)
    }

    async fn update_valid_until(&mut self, application_id: i64, valid_until: NaiveDate) -> Result<(), StoreError> {
        sqlx::query("UPDATE registrations SET valid_until = $2 WHERE application_id = $1")
            .bind(application_id)
            .bind(valid_until)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn update_owner(&mut self, application_id: i64, new_owner_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE registrations SET owner_id = $2 WHERE application_id = $1")
            .bind(application_id)
            .bind(new_owner_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO insurance_policies (policy_number, application_id, company_name, policy_type, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&policy.policy_number)
        .bind(policy.application_id)
        .bind(&policy.company_name)
        .bind(&policy.policy_type)
        .bind(policy.start_date)
        .bind(policy.end_date)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn replace_insurance(&mut self, policy: &InsurancePolicy) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM insurance_policies WHERE application_id = $1")
            .bind(policy.application_id)
            .execute(&mut *self.tx)
            .await?;

        self.insert_insurance(policy).await
    }

    async fn append_renewal(&mut self, entry: &RenewalHistoryEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO renewal_history (application_id, renewal_date, old_valid_until, new_valid_until, new_policy_number)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.application_id)
        .bind(entry.renewal_date)
        .bind(entry.old_valid_until)
        .bind(entry.new_valid_until)
        .bind(&entry.new_policy_number)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payments (transaction_id, application_id, payment_for, amount, payment_status, payment_date, new_owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&payment.transaction_id)
        .bind(payment.application_id)
        .bind(payment.payment_for.as_str())
        .bind(payment.amount)
        .bind(payment.payment_status.as_str())
        .bind(payment.payment_date)
        .bind(payment.new_owner_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn mark_payment_paid(
        &mut self,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET payment_status = $3, payment_date = $2
            WHERE transaction_id = $1 AND payment_status = $4
            RETURNING transaction_id, application_id, payment_for, amount, payment_status, payment_date, new_owner_id
            "#,
        )
        .bind(transaction_id)
        .bind(paid_at)
        .bind(PaymentStatus::Paid.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(payment)
    }

    async fn insert_learner_licence(&mut self, user_id: i64, classes: &[String]) -> Result<i64, StoreError> {
        let (llno,): (i64,) = sqlx::query_as(
            "INSERT INTO learner_licences (user_id, licence_classes, status) VALUES ($1, $2, $3) RETURNING llno",
        )
        .bind(user_id)
        .bind(classes)
        .bind(LICENCE_STATUS_APPLIED)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(llno)
    }

    async fn learner_licence_held_by(&mut self, llno: i64, user_id: i64) -> Result<bool, StoreError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM learner_licences WHERE llno = $1 AND user_id = $2)")
                .bind(llno)
                .bind(user_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(result.0)
    }

    async fn insert_driving_test(&mut self, test: &NewDrivingTest) -> Result<i64, StoreError> {
        let (application_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO driving_tests (llno, user_id, test_date, time_slot, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING application_id
            "#,
        )
        .bind(test.llno)
        .bind(test.user_id)
        .bind(test.test_date)
        .bind(&test.time_slot)
        .bind(TEST_STATUS_SCHEDULED)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(application_id)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

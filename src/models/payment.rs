//! Modelo de Payment
//!
//! Máquina de estados del pago: `Pending → Paid`, sin retroceso.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Estado del pago - columna payment_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            _ => Err(UnknownVariant { kind: "payment status", value }),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concepto del pago - columna payment_for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPurpose {
    #[serde(rename = "New Registration")]
    NewRegistration,
    #[serde(rename = "Ownership Transfer")]
    OwnershipTransfer,
}

impl PaymentPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::NewRegistration => "New Registration",
            PaymentPurpose::OwnershipTransfer => "Ownership Transfer",
        }
    }

    /// Prefijo visible del transaction id
    pub fn id_prefix(&self) -> &'static str {
        match self {
            PaymentPurpose::NewRegistration => "TXN-REG",
            PaymentPurpose::OwnershipTransfer => "TXN-TNSF",
        }
    }
}

impl TryFrom<String> for PaymentPurpose {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "New Registration" => Ok(PaymentPurpose::NewRegistration),
            "Ownership Transfer" => Ok(PaymentPurpose::OwnershipTransfer),
            _ => Err(UnknownVariant { kind: "payment purpose", value }),
        }
    }
}

/// Payment - mapea a la tabla payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Payment {
    pub transaction_id: String,
    pub application_id: i64,
    #[sqlx(try_from = "String")]
    pub payment_for: PaymentPurpose,
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    /// Comprador fijado en la fase A de una transferencia
    pub new_owner_id: Option<i64>,
}

impl Payment {
    pub fn pending(
        transaction_id: String,
        application_id: i64,
        payment_for: PaymentPurpose,
        amount: Decimal,
    ) -> Self {
        Self {
            transaction_id,
            application_id,
            payment_for,
            amount,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            new_owner_id: None,
        }
    }

    /// Fija el comprador aprobado por el vendedor
    pub fn for_new_owner(mut self, new_owner_id: i64) -> Self {
        self.new_owner_id = Some(new_owner_id);
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

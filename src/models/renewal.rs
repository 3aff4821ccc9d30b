//! Historial de renovaciones (solo inserción)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// RenewalHistoryEntry - mapea a la tabla renewal_history
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RenewalHistoryEntry {
    pub application_id: i64,
    pub renewal_date: NaiveDate,
    pub old_valid_until: NaiveDate,
    pub new_valid_until: NaiveDate,
    pub new_policy_number: String,
}

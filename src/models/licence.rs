//! Modelos de licencia de aprendiz y examen de conducir

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const LICENCE_STATUS_APPLIED: &str = "Applied";
pub const TEST_STATUS_SCHEDULED: &str = "Scheduled";

/// LearnerLicence - mapea a la tabla learner_licences
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct LearnerLicence {
    pub llno: i64,
    pub user_id: i64,
    pub licence_classes: Vec<String>,
    pub status: String,
}

/// DrivingTest - mapea a la tabla driving_tests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DrivingTest {
    pub application_id: i64,
    pub llno: i64,
    pub user_id: i64,
    pub test_date: NaiveDate,
    pub time_slot: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewDrivingTest {
    pub llno: i64,
    pub user_id: i64,
    pub test_date: NaiveDate,
    pub time_slot: String,
}

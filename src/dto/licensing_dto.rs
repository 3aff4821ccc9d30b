use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::OwnerId;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyLearnerLicenceRequest {
    pub user_id: OwnerId,
    #[validate(length(min = 1))]
    pub licence_classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyLearnerLicenceRequest {
    pub llno: i64,
    pub user_id: OwnerId,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleTestRequest {
    pub user_id: OwnerId,
    pub llno: i64,
    pub test_date: NaiveDate,
    #[validate(length(min = 1, max = 32))]
    pub time_slot: String,
}

#[derive(Debug, Serialize)]
pub struct LearnerLicenceResponse {
    pub llno: i64,
}

#[derive(Debug, Serialize)]
pub struct DrivingTestResponse {
    pub application_id: i64,
    pub llno: i64,
    pub test_date: NaiveDate,
    pub time_slot: String,
}

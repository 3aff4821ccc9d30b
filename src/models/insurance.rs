//! Modelo de InsurancePolicy
//!
//! A lo sumo una póliza por `application_id`; la renovación la reemplaza.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::utils::validation::validate_not_blank;

/// InsurancePolicy - mapea a la tabla insurance_policies
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct InsurancePolicy {
    pub policy_number: String,
    pub application_id: i64,
    pub company_name: String,
    pub policy_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Póliza aportada por el solicitante (alta o renovación)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_policy_period"))]
pub struct InsuranceDetails {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub policy_number: String,

    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub company_name: String,

    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub policy_type: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl InsuranceDetails {
    pub fn bind_to(self, application_id: i64) -> InsurancePolicy {
        InsurancePolicy {
            policy_number: self.policy_number,
            application_id,
            company_name: self.company_name,
            policy_type: self.policy_type,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

fn validate_policy_period(details: &InsuranceDetails) -> Result<(), ValidationError> {
    if details.end_date <= details.start_date {
        return Err(ValidationError::new("policy_period"));
    }
    Ok(())
}

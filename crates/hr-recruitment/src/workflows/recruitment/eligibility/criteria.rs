use serde::{Deserialize, Serialize};

use super::super::domain::{EducationLevel, Gender};

/// Screening thresholds configured on a job posting. Unset fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_education: Option<EducationLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_experience_years: Option<u8>,
}

impl EligibilityCriteria {
    /// Edit-time validation; evaluation assumes criteria already passed this.
    pub fn validate(&self) -> Result<(), EligibilityCriteriaError> {
        if let (Some(min_age), Some(max_age)) = (self.min_age, self.max_age) {
            if max_age < min_age {
                return Err(EligibilityCriteriaError::InvertedAgeRange { min_age, max_age });
            }
        }

        Ok(())
    }

    pub fn is_unconstrained(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EligibilityCriteriaError {
    #[error("maximum age {max_age} must be greater than or equal to minimum age {min_age}")]
    InvertedAgeRange { min_age: u8, max_age: u8 },
}

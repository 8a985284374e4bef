mod criteria;
mod rules;

pub use criteria::{EligibilityCriteria, EligibilityCriteriaError};

use super::domain::{EducationLevel, Gender, ProfileSnapshot};
use serde::{Deserialize, Serialize};

/// Screening outcome for a submitted profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum EligibilityDecision {
    Admit,
    Reject(IneligibilityReason),
}

impl EligibilityDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Admit => "meets all eligibility criteria".to_string(),
            Self::Reject(reason) => reason.summary(),
        }
    }
}

/// The first criterion a profile failed, with the threshold and the observed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    BelowMinimumAge {
        required: u8,
        actual: Option<u8>,
    },
    AboveMaximumAge {
        limit: u8,
        actual: Option<u8>,
    },
    GenderMismatch {
        required: Gender,
        actual: Option<Gender>,
    },
    InsufficientEducation {
        required: EducationLevel,
        actual: Option<EducationLevel>,
    },
    InsufficientExperience {
        required: u8,
        actual: Option<u8>,
    },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            Self::BelowMinimumAge { required, actual } => match actual {
                Some(age) => format!("minimum age is {required} (candidate is {age})"),
                None => format!("minimum age is {required} (age not provided)"),
            },
            Self::AboveMaximumAge { limit, actual } => match actual {
                Some(age) => format!("maximum age is {limit} (candidate is {age})"),
                None => format!("maximum age is {limit} (age not provided)"),
            },
            Self::GenderMismatch { required, actual } => match actual {
                Some(gender) => format!(
                    "posting is restricted to {} candidates (candidate is {})",
                    required.label(),
                    gender.label()
                ),
                None => format!(
                    "posting is restricted to {} candidates (gender not provided)",
                    required.label()
                ),
            },
            Self::InsufficientEducation { required, actual } => match actual {
                Some(level) => format!(
                    "minimum education is {} (candidate has {})",
                    required.label(),
                    level.label()
                ),
                None => format!(
                    "minimum education is {} (education not provided)",
                    required.label()
                ),
            },
            Self::InsufficientExperience { required, actual } => match actual {
                Some(years) => format!(
                    "minimum experience is {required} year(s) (candidate has {years})"
                ),
                None => format!("minimum experience is {required} year(s) (experience not provided)"),
            },
        }
    }
}

/// Screen a profile against a posting's criteria. Pure and deterministic.
pub fn evaluate(profile: &ProfileSnapshot, criteria: &EligibilityCriteria) -> EligibilityDecision {
    rules::ORDERED_CHECKS
        .iter()
        .find_map(|check| check(profile, criteria))
        .map_or(EligibilityDecision::Admit, EligibilityDecision::Reject)
}

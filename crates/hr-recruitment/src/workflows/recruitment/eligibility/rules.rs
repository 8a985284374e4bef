use super::super::domain::ProfileSnapshot;
use super::criteria::EligibilityCriteria;
use super::IneligibilityReason;

type Check = fn(&ProfileSnapshot, &EligibilityCriteria) -> Option<IneligibilityReason>;

/// Evaluation order is part of the contract: the first failing check names the reason.
pub(crate) const ORDERED_CHECKS: [Check; 5] = [
    check_min_age,
    check_max_age,
    check_gender,
    check_min_education,
    check_min_experience,
];

fn check_min_age(
    profile: &ProfileSnapshot,
    criteria: &EligibilityCriteria,
) -> Option<IneligibilityReason> {
    let required = criteria.min_age?;
    match profile.age {
        Some(age) if age >= required => None,
        actual => Some(IneligibilityReason::BelowMinimumAge { required, actual }),
    }
}

fn check_max_age(
    profile: &ProfileSnapshot,
    criteria: &EligibilityCriteria,
) -> Option<IneligibilityReason> {
    let limit = criteria.max_age?;
    match profile.age {
        Some(age) if age <= limit => None,
        actual => Some(IneligibilityReason::AboveMaximumAge { limit, actual }),
    }
}

fn check_gender(
    profile: &ProfileSnapshot,
    criteria: &EligibilityCriteria,
) -> Option<IneligibilityReason> {
    let required = criteria.gender?;
    match profile.gender {
        Some(gender) if gender == required => None,
        actual => Some(IneligibilityReason::GenderMismatch { required, actual }),
    }
}

fn check_min_education(
    profile: &ProfileSnapshot,
    criteria: &EligibilityCriteria,
) -> Option<IneligibilityReason> {
    let required = criteria.min_education?;
    match profile.education {
        Some(level) if level >= required => None,
        actual => Some(IneligibilityReason::InsufficientEducation { required, actual }),
    }
}

fn check_min_experience(
    profile: &ProfileSnapshot,
    criteria: &EligibilityCriteria,
) -> Option<IneligibilityReason> {
    let required = criteria.min_experience_years?;
    match profile.experience_years {
        Some(years) if years >= required => None,
        actual => Some(IneligibilityReason::InsufficientExperience { required, actual }),
    }
}

//! Recruitment and onboarding lifecycle: job postings, eligibility screening, the application
//! state machine, interview scheduling, onboarding/offboarding checklists, and the division
//! capacity guard consulted by job openings and conversions to staff.

pub mod capacity;
pub mod checklist;
pub mod domain;
pub mod eligibility;
pub mod jobs;
pub mod lifecycle;
pub mod offboarding;
pub mod onboarding;
pub mod repository;
pub mod router;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod tests;

pub use capacity::{CapacityError, Division, DivisionRegistry, DivisionView};
pub use checklist::{progress_percent, Checklist, ChecklistEntry, ChecklistError, ChecklistItem};
pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, CandidateContact, DivisionId,
    EducationLevel, ErrorKind, Gender, InterviewMode, InterviewSchedule, InterviewVenue, JobId,
    ProfileSnapshot,
};
pub use eligibility::{
    evaluate, EligibilityCriteria, EligibilityCriteriaError, EligibilityDecision,
    IneligibilityReason,
};
pub use jobs::{JobPosting, JobPostingError, JobPostingRequest, JobPostingStatus};
pub use lifecycle::{
    ApplicationStage, LifecycleAction, Rejection, RejectionSource, StatusAction, TransitionError,
};
pub use offboarding::{
    OffboardingError, OffboardingId, OffboardingItem, OffboardingRequest, OffboardingStatus,
    OffboardingTracker, OffboardingView,
};
pub use onboarding::{Onboarding, OnboardingError, OnboardingItem, OnboardingStatus, OnboardingView};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, JobPostingRepository,
    ProvisioningError, RepositoryError, StaffAccountProvisioner, StaffAccountRequest,
};
pub use router::{error_response, offboarding_router, recruitment_router};
pub use scheduler::{InterviewRequest, ScheduledInterview, SchedulingError};
pub use service::{Clock, Conversion, RecruitmentService, RecruitmentServiceError, SystemClock};

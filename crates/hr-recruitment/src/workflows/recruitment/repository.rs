use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateContact, DivisionId, InterviewSchedule, JobId,
    ProfileSnapshot,
};
use super::jobs::JobPosting;
use super::lifecycle::{ApplicationStage, RejectionSource};
use super::onboarding::OnboardingView;

/// Repository record for one applicant. `profile` is the snapshot taken at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub division_id: DivisionId,
    pub position: String,
    pub candidate: CandidateContact,
    pub profile: ProfileSnapshot,
    pub stage: ApplicationStage,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn status(&self) -> ApplicationStatus {
        self.stage.status()
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        let rejection = self.stage.rejection();
        ApplicationStatusView {
            application_id: self.id.clone(),
            job_id: self.job_id.clone(),
            division_id: self.division_id.clone(),
            position: self.position.clone(),
            candidate_name: self.candidate.name.clone(),
            status: self.status(),
            rejection_reason: rejection.map(|rejection| rejection.reason.clone()),
            rejection_source: rejection.map(|rejection| rejection.source),
            interview: self.stage.schedule().cloned(),
            onboarding: self.stage.onboarding().map(|onboarding| onboarding.view()),
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

pub trait JobPostingRepository: Send + Sync {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError>;
    fn update(&self, posting: JobPosting) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that creates the staff account for a converted applicant.
pub trait StaffAccountProvisioner: Send + Sync {
    fn create_staff_account(&self, request: StaffAccountRequest) -> Result<(), ProvisioningError>;
}

/// "Create staff account" event emitted exactly once per converted applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAccountRequest {
    pub application_id: ApplicationId,
    pub name: String,
    pub email: String,
    pub division_id: DivisionId,
    pub position: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("staff directory unavailable: {0}")]
    Transport(String),
    #[error("staff account rejected: {0}")]
    Rejected(String),
}

/// Read model for one application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub division_id: DivisionId,
    pub position: String,
    pub candidate_name: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_source: Option<RejectionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<OnboardingView>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::recruitment::capacity::{Division, DivisionRegistry};
use crate::workflows::recruitment::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, CandidateContact, DivisionId,
    EducationLevel, Gender, InterviewMode, JobId, ProfileSnapshot,
};
use crate::workflows::recruitment::eligibility::EligibilityCriteria;
use crate::workflows::recruitment::jobs::{JobPosting, JobPostingRequest};
use crate::workflows::recruitment::repository::{
    ApplicationRecord, ApplicationRepository, JobPostingRepository, ProvisioningError,
    RepositoryError, StaffAccountProvisioner, StaffAccountRequest,
};
use crate::workflows::recruitment::scheduler::InterviewRequest;
use crate::workflows::recruitment::service::{Clock, RecruitmentService};

pub(super) type MemoryService = RecruitmentService<MemoryApplications, MemoryJobs, MemoryProvisioner>;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

/// Clock pinned to 2026-10-19 09:00 UTC.
pub(super) struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn today(&self) -> NaiveDate {
        today()
    }
}

pub(super) fn finance() -> DivisionId {
    DivisionId("div-finance".to_string())
}

pub(super) fn registry(capacity: u32, staff: u32) -> Arc<DivisionRegistry> {
    let registry = Arc::new(DivisionRegistry::new());
    registry
        .register(Division::new(finance(), "Finance", capacity, staff).expect("valid division"))
        .expect("registered");
    registry
}

pub(super) struct Harness {
    pub(super) service: Arc<MemoryService>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) provisioner: Arc<MemoryProvisioner>,
    pub(super) divisions: Arc<DivisionRegistry>,
}

pub(super) fn harness(capacity: u32, staff: u32) -> Harness {
    harness_with(capacity, staff, MemoryProvisioner::default())
}

pub(super) fn harness_with(capacity: u32, staff: u32, provisioner: MemoryProvisioner) -> Harness {
    let applications = Arc::new(MemoryApplications::default());
    let jobs = Arc::new(MemoryJobs::default());
    let provisioner = Arc::new(provisioner);
    let divisions = registry(capacity, staff);
    let service = Arc::new(RecruitmentService::new(
        applications.clone(),
        jobs,
        provisioner.clone(),
        divisions.clone(),
        Arc::new(FixedClock),
    ));

    Harness {
        service,
        applications,
        provisioner,
        divisions,
    }
}

pub(super) fn job_request() -> JobPostingRequest {
    JobPostingRequest {
        division_id: finance(),
        title: "Accounting Staff".to_string(),
        description: "Monthly closing and reconciliation".to_string(),
        requirements: vec!["Bookkeeping".to_string()],
        eligibility: EligibilityCriteria {
            min_age: Some(21),
            max_age: Some(40),
            gender: None,
            min_education: Some(EducationLevel::D3),
            min_experience_years: Some(1),
        },
    }
}

pub(super) fn profile() -> ProfileSnapshot {
    ProfileSnapshot {
        age: Some(27),
        gender: Some(Gender::Female),
        education: Some(EducationLevel::S1),
        experience_years: Some(3),
    }
}

pub(super) fn submission(job_id: &JobId) -> ApplicationSubmission {
    ApplicationSubmission {
        candidate: CandidateContact {
            name: "Ayu Pratiwi".to_string(),
            email: "ayu.pratiwi@example.com".to_string(),
        },
        profile: profile(),
        job_id: job_id.clone(),
    }
}

pub(super) fn online_interview(link: Option<&str>) -> InterviewRequest {
    InterviewRequest {
        date: NaiveDate::from_ymd_opt(2026, 10, 22).expect("valid date"),
        start_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        end_time: None,
        mode: InterviewMode::Online,
        interviewer_name: "Rudi Hartono".to_string(),
        link_or_location: link.map(str::to_string),
        notes: None,
    }
}

/// Open a posting and submit an eligible candidate, returning the application id.
pub(super) fn admitted_application(harness: &Harness) -> ApplicationId {
    let posting = harness.service.open_job(job_request()).expect("job opens");
    let record = harness
        .service
        .submit(submission(&posting.id))
        .expect("submission stored");
    assert_eq!(record.status(), ApplicationStatus::Applied);
    record.id
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl MemoryApplications {
    pub(super) fn stored(&self, id: &ApplicationId) -> ApplicationRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    postings: Mutex<HashMap<JobId, JobPosting>>,
}

impl JobPostingRepository for MemoryJobs {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = self.postings.lock().expect("job mutex poisoned");
        if guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn update(&self, posting: JobPosting) -> Result<(), RepositoryError> {
        let mut guard = self.postings.lock().expect("job mutex poisoned");
        guard.insert(posting.id.clone(), posting);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = self.postings.lock().expect("job mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Records every account event; `failing` makes each call fail instead.
///
/// When a repository is attached through `observe`, each call also records whether the
/// application was already stored as converted at the moment the account was requested.
#[derive(Default)]
pub(super) struct MemoryProvisioner {
    failing: bool,
    events: Mutex<Vec<StaffAccountRequest>>,
    observed: Mutex<Option<Arc<MemoryApplications>>>,
    stored_converted: Mutex<Vec<bool>>,
}

impl MemoryProvisioner {
    pub(super) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(super) fn events(&self) -> Vec<StaffAccountRequest> {
        self.events.lock().expect("provisioner mutex poisoned").clone()
    }

    pub(super) fn observe(&self, applications: Arc<MemoryApplications>) {
        *self.observed.lock().expect("provisioner mutex poisoned") = Some(applications);
    }

    pub(super) fn stored_converted(&self) -> Vec<bool> {
        self.stored_converted
            .lock()
            .expect("provisioner mutex poisoned")
            .clone()
    }
}

impl StaffAccountProvisioner for MemoryProvisioner {
    fn create_staff_account(&self, request: StaffAccountRequest) -> Result<(), ProvisioningError> {
        let observed = self
            .observed
            .lock()
            .expect("provisioner mutex poisoned")
            .clone();
        if let Some(applications) = observed {
            let converted = applications
                .stored(&request.application_id)
                .stage
                .onboarding()
                .is_some_and(|onboarding| onboarding.is_converted_to_staff());
            self.stored_converted
                .lock()
                .expect("provisioner mutex poisoned")
                .push(converted);
        }
        if self.failing {
            return Err(ProvisioningError::Transport("directory offline".to_string()));
        }
        self.events
            .lock()
            .expect("provisioner mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

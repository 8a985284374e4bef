use chrono::NaiveDate;
use hr_recruitment::workflows::recruitment::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus, JobId, JobPosting,
    JobPostingRepository, ProvisioningError, RepositoryError, StaffAccountProvisioner,
    StaffAccountRequest,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = lock(&self.records);
        let mut records: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect();
        records.sort_by(|left, right| left.submitted_at.cmp(&right.submitted_at));
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobPostingRepository {
    postings: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl JobPostingRepository for InMemoryJobPostingRepository {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.postings);
        if guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn update(&self, posting: JobPosting) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.postings);
        if guard.contains_key(&posting.id) {
            guard.insert(posting.id.clone(), posting);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(lock(&self.postings).get(id).cloned())
    }
}

/// Stand-in for the staff directory: records each account request and logs it.
#[derive(Default, Clone)]
pub(crate) struct LoggingProvisioner {
    accounts: Arc<Mutex<Vec<StaffAccountRequest>>>,
}

impl StaffAccountProvisioner for LoggingProvisioner {
    fn create_staff_account(&self, request: StaffAccountRequest) -> Result<(), ProvisioningError> {
        info!(
            application = %request.application_id,
            division = %request.division_id,
            email = %request.email,
            "staff account provisioned"
        );
        lock(&self.accounts).push(request);
        Ok(())
    }
}

impl LoggingProvisioner {
    pub(crate) fn accounts(&self) -> Vec<StaffAccountRequest> {
        lock(&self.accounts).clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

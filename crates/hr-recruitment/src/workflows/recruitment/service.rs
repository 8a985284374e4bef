use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{error, info, warn};

use super::capacity::{CapacityError, DivisionRegistry, DivisionView};
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, DivisionId, ErrorKind, JobId,
};
use super::eligibility::{self, EligibilityDecision};
use super::jobs::{JobPosting, JobPostingError, JobPostingRequest};
use super::lifecycle::{ApplicationStage, LifecycleAction, StatusAction, TransitionError};
use super::onboarding::{Onboarding, OnboardingError};
use super::repository::{
    ApplicationRecord, ApplicationRepository, JobPostingRepository, ProvisioningError,
    RepositoryError, StaffAccountProvisioner, StaffAccountRequest,
};
use super::scheduler::{self, InterviewRequest, SchedulingError};

/// Source of "now" and "today" for the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

/// Wall clock; "today" is the calendar date at the configured UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

/// Outcome of a successful conversion: the frozen record and the emitted account event.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub record: ApplicationRecord,
    pub account: StaffAccountRequest,
}

/// Service composing job postings, the application lifecycle, and the division capacity guard.
///
/// Every write to an application runs inside its division's critical section, so a conversion
/// never interleaves with another change to the same record.
pub struct RecruitmentService<R, J, P> {
    applications: Arc<R>,
    jobs: Arc<J>,
    provisioner: Arc<P>,
    divisions: Arc<DivisionRegistry>,
    clock: Arc<dyn Clock>,
}

impl<R, J, P> RecruitmentService<R, J, P>
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    pub fn new(
        applications: Arc<R>,
        jobs: Arc<J>,
        provisioner: Arc<P>,
        divisions: Arc<DivisionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            applications,
            jobs,
            provisioner,
            divisions,
            clock,
        }
    }

    pub fn divisions(&self) -> &Arc<DivisionRegistry> {
        &self.divisions
    }

    /// Open a posting. The division must have a free slot at the moment of opening.
    pub fn open_job(
        &self,
        request: JobPostingRequest,
    ) -> Result<JobPosting, RecruitmentServiceError> {
        let posting = JobPosting::open(next_job_id(), request, self.clock.now())?;
        let division_id = posting.division_id.clone();

        let result = self.divisions.critical_section(&division_id, |division| {
            division.ensure_can_open_job()?;
            Ok::<_, RecruitmentServiceError>(self.jobs.insert(posting)?)
        });

        match &result {
            Ok(posting) => info!(
                job = %posting.id,
                division = %posting.division_id,
                title = %posting.title,
                "job posting opened"
            ),
            Err(err) if err.kind() == ErrorKind::CapacityExceeded => {
                warn!(division = %division_id, error = %err, "job opening denied")
            }
            Err(_) => {}
        }
        result
    }

    pub fn edit_job(
        &self,
        job_id: &JobId,
        request: JobPostingRequest,
    ) -> Result<JobPosting, RecruitmentServiceError> {
        let posting = self.fetch_job(job_id)?;
        let edited = posting.edit(request, self.clock.now())?;
        self.jobs.update(edited.clone())?;
        info!(job = %edited.id, "job posting edited");
        Ok(edited)
    }

    pub fn close_job(&self, job_id: &JobId) -> Result<JobPosting, RecruitmentServiceError> {
        let posting = self.fetch_job(job_id)?;
        let closed = posting.close(self.clock.now())?;
        self.jobs.update(closed.clone())?;
        info!(job = %closed.id, "job posting closed");
        Ok(closed)
    }

    pub fn get_job(&self, job_id: &JobId) -> Result<JobPosting, RecruitmentServiceError> {
        self.fetch_job(job_id)
    }

    /// Screen a submission against its posting and store it as Applied or Rejected.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        let ApplicationSubmission {
            candidate,
            profile,
            job_id,
        } = submission;

        let posting = self
            .jobs
            .fetch(&job_id)?
            .ok_or_else(|| RecruitmentServiceError::UnknownJob(job_id.clone()))?;
        if !posting.is_open() {
            return Err(RecruitmentServiceError::JobClosed(job_id));
        }

        let decision = eligibility::evaluate(&profile, &posting.eligibility);
        let now = self.clock.now();
        let record = ApplicationRecord {
            id: next_application_id(),
            job_id: posting.id,
            division_id: posting.division_id,
            position: posting.title,
            candidate,
            profile,
            stage: ApplicationStage::from_eligibility(&decision),
            submitted_at: now,
            updated_at: now,
        };

        let stored = self.applications.insert(record)?;
        match &decision {
            EligibilityDecision::Admit => {
                info!(application = %stored.id, job = %stored.job_id, "application submitted")
            }
            EligibilityDecision::Reject(reason) => info!(
                application = %stored.id,
                job = %stored.job_id,
                reason = %reason.summary(),
                "application rejected by eligibility screening"
            ),
        }
        Ok(stored)
    }

    /// Apply an HR status action.
    pub fn apply_action(
        &self,
        application_id: &ApplicationId,
        action: StatusAction,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        let kind = action.kind();
        match action {
            StatusAction::Interview { schedule } => {
                self.schedule_interview(application_id, schedule)
            }
            StatusAction::Screen => self.mutate(application_id, kind, |stage| {
                *stage = stage.screen()?;
                Ok(())
            }),
            StatusAction::Accept => self.mutate(application_id, kind, |stage| {
                *stage = stage.accept()?;
                Ok(())
            }),
            StatusAction::Reject { reason } => self.mutate(application_id, kind, |stage| {
                *stage = stage.reject(reason.as_deref())?;
                Ok(())
            }),
        }
    }

    /// Attach or replace the interview slot.
    pub fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        request: InterviewRequest,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        let today = self.clock.today();
        self.mutate(
            application_id,
            LifecycleAction::ScheduleInterview,
            |stage| {
                let scheduled = scheduler::schedule(stage, request, today)?;
                if scheduled.rescheduled {
                    info!(application = %application_id, "interview rescheduled");
                }
                *stage = scheduled.stage;
                Ok(())
            },
        )
    }

    /// Toggle one onboarding item of a hired applicant.
    pub fn toggle_checklist_item(
        &self,
        application_id: &ApplicationId,
        item_name: &str,
        done: bool,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        self.mutate_onboarding(application_id, |onboarding| {
            onboarding.toggle(item_name, done)
        })
    }

    pub fn complete_checklist(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        self.mutate_onboarding(application_id, Onboarding::mark_complete)
    }

    /// Convert a hired applicant with a finished checklist into staff.
    ///
    /// The checklist check, the slot consumption, the account event and the record update all
    /// happen inside the division's critical section. The converted record is stored only after
    /// the provisioner accepts the account, so readers never see a conversion that is later
    /// undone. If the provisioner fails the slot is not consumed.
    pub fn convert_to_staff(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Conversion, RecruitmentServiceError> {
        let division_id = self.fetch(application_id)?.division_id;
        let now = self.clock.now();

        let result: Result<Conversion, RecruitmentServiceError> =
            self.divisions.critical_section(&division_id, |division| {
                let mut record = self.fetch(application_id)?;
                let illegal = record.stage.illegal(LifecycleAction::ConvertToStaff);
                let onboarding = record.stage.onboarding_mut().ok_or(illegal)?;

                onboarding.ensure_convertible()?;
                division.admit_staff()?;
                onboarding.mark_converted(now)?;
                record.updated_at = now;

                let account = StaffAccountRequest {
                    application_id: record.id.clone(),
                    name: record.candidate.name.clone(),
                    email: record.candidate.email.clone(),
                    division_id: record.division_id.clone(),
                    position: record.position.clone(),
                };
                self.provisioner.create_staff_account(account.clone())?;

                if let Err(err) = self.applications.update(record.clone()) {
                    error!(
                        application = %application_id,
                        email = %account.email,
                        error = %err,
                        "staff account provisioned but converted application was not stored"
                    );
                    return Err(err.into());
                }

                Ok(Conversion { record, account })
            });

        match &result {
            Ok(conversion) => info!(
                application = %application_id,
                division = %division_id,
                email = %conversion.account.email,
                "applicant converted to staff"
            ),
            Err(err) => warn!(
                application = %application_id,
                division = %division_id,
                kind = err.kind().label(),
                error = %err,
                "conversion to staff refused"
            ),
        }
        result
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        self.fetch(application_id)
    }

    pub fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RecruitmentServiceError> {
        Ok(self.applications.list_by_status(status)?)
    }

    pub fn division(&self, id: &DivisionId) -> Result<DivisionView, RecruitmentServiceError> {
        Ok(self.divisions.get(id)?)
    }

    fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, RecruitmentServiceError> {
        self.applications
            .fetch(application_id)?
            .ok_or_else(|| RecruitmentServiceError::ApplicationNotFound(application_id.clone()))
    }

    fn fetch_job(&self, job_id: &JobId) -> Result<JobPosting, RecruitmentServiceError> {
        self.jobs
            .fetch(job_id)?
            .ok_or_else(|| RecruitmentServiceError::JobNotFound(job_id.clone()))
    }

    fn mutate_onboarding<F>(
        &self,
        application_id: &ApplicationId,
        change: F,
    ) -> Result<ApplicationRecord, RecruitmentServiceError>
    where
        F: FnOnce(&mut Onboarding) -> Result<u8, OnboardingError>,
    {
        self.mutate(application_id, LifecycleAction::UpdateOnboarding, |stage| {
            let illegal = stage.illegal(LifecycleAction::UpdateOnboarding);
            let onboarding = stage.onboarding_mut().ok_or(illegal)?;
            let progress = change(onboarding)?;
            info!(application = %application_id, progress, "onboarding checklist updated");
            Ok(())
        })
    }

    /// Re-read the record under its division lock, apply `change` to a copy of the stage, and
    /// store it only if the change succeeds.
    fn mutate<F>(
        &self,
        application_id: &ApplicationId,
        action: LifecycleAction,
        change: F,
    ) -> Result<ApplicationRecord, RecruitmentServiceError>
    where
        F: FnOnce(&mut ApplicationStage) -> Result<(), RecruitmentServiceError>,
    {
        let division_id = self.fetch(application_id)?.division_id;

        self.divisions.critical_section(&division_id, |_| {
            let mut record = self.fetch(application_id)?;
            let from = record.status();
            let mut stage = record.stage.clone();
            if let Err(err) = change(&mut stage) {
                warn!(
                    application = %application_id,
                    action = action.label(),
                    status = %from,
                    error = %err,
                    "application change refused"
                );
                return Err(err);
            }

            record.stage = stage;
            record.updated_at = self.clock.now();
            self.applications.update(record.clone())?;
            if record.status() != from {
                info!(
                    application = %application_id,
                    from = %from,
                    to = %record.status(),
                    "application status changed"
                );
            }
            Ok(record)
        })
    }
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitmentServiceError {
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("job posting {0} not found")]
    JobNotFound(JobId),
    #[error("job posting {0} does not exist")]
    UnknownJob(JobId),
    #[error("job posting {0} is closed for applications")]
    JobClosed(JobId),
    #[error(transparent)]
    Job(#[from] JobPostingError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}

impl RecruitmentServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ApplicationNotFound(_) | Self::JobNotFound(_) => ErrorKind::NotFound,
            Self::UnknownJob(_) | Self::JobClosed(_) => ErrorKind::Validation,
            Self::Job(err) => err.kind(),
            Self::Transition(err) => err.kind(),
            Self::Scheduling(err) => err.kind(),
            Self::Onboarding(err) => err.kind(),
            Self::Capacity(err) => err.kind(),
            Self::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            Self::Repository(RepositoryError::Conflict) => ErrorKind::PreconditionNotMet,
            Self::Repository(RepositoryError::Unavailable(_)) | Self::Provisioning(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

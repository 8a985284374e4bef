use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{DivisionId, ErrorKind, JobId};
use super::eligibility::{EligibilityCriteria, EligibilityCriteriaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPostingStatus {
    Open,
    Closed,
}

impl JobPostingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Payload used to open or edit a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostingRequest {
    pub division_id: DivisionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default, alias = "eligibility_criteria")]
    pub eligibility: EligibilityCriteria,
}

/// A vacancy in one division. Applicants are screened against `eligibility` on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub id: JobId,
    pub division_id: DivisionId,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub eligibility: EligibilityCriteria,
    pub status: JobPostingStatus,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn open(
        id: JobId,
        request: JobPostingRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, JobPostingError> {
        let request = validate_request(request)?;

        Ok(Self {
            id,
            division_id: request.division_id,
            title: request.title,
            description: request.description,
            requirements: request.requirements,
            eligibility: request.eligibility,
            status: JobPostingStatus::Open,
            opened_at: now,
            updated_at: now,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == JobPostingStatus::Open
    }

    /// Replace the editable fields. A posting cannot move to another division.
    pub fn edit(
        &self,
        request: JobPostingRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, JobPostingError> {
        self.ensure_open()?;
        if request.division_id != self.division_id {
            return Err(JobPostingError::DivisionMismatch {
                job: self.id.clone(),
                expected: self.division_id.clone(),
                found: request.division_id,
            });
        }

        let request = validate_request(request)?;
        Ok(Self {
            title: request.title,
            description: request.description,
            requirements: request.requirements,
            eligibility: request.eligibility,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn close(&self, now: DateTime<Utc>) -> Result<Self, JobPostingError> {
        self.ensure_open()?;
        Ok(Self {
            status: JobPostingStatus::Closed,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn ensure_open(&self) -> Result<(), JobPostingError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(JobPostingError::Closed(self.id.clone()))
        }
    }
}

fn validate_request(mut request: JobPostingRequest) -> Result<JobPostingRequest, JobPostingError> {
    request.title = request.title.trim().to_string();
    if request.title.is_empty() {
        return Err(JobPostingError::MissingTitle);
    }
    request.eligibility.validate()?;
    request.requirements = request
        .requirements
        .into_iter()
        .map(|requirement| requirement.trim().to_string())
        .filter(|requirement| !requirement.is_empty())
        .collect();
    Ok(request)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobPostingError {
    #[error("job title is required")]
    MissingTitle,
    #[error(transparent)]
    Criteria(#[from] EligibilityCriteriaError),
    #[error("job posting {0} is closed")]
    Closed(JobId),
    #[error("job posting {job} belongs to division {expected}, not {found}")]
    DivisionMismatch {
        job: JobId,
        expected: DivisionId,
        found: DivisionId,
    },
}

impl JobPostingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Closed(_) => ErrorKind::PreconditionNotMet,
            Self::MissingTitle | Self::Criteria(_) | Self::DivisionMismatch { .. } => {
                ErrorKind::Validation
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, ErrorKind, InterviewSchedule};
use super::eligibility::EligibilityDecision;
use super::onboarding::Onboarding;
use super::scheduler::InterviewRequest;

/// Application state. Each variant carries only the data that exists in that status: a schedule
/// from `Interview` onwards, onboarding only once hired, and a reason only when rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationStage {
    Applied,
    Screening,
    Interview {
        schedule: InterviewSchedule,
    },
    Hired {
        schedule: Option<InterviewSchedule>,
        onboarding: Onboarding,
    },
    Rejected {
        rejection: Rejection,
        schedule: Option<InterviewSchedule>,
    },
}

/// Why an application was rejected and who decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub source: RejectionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionSource {
    Eligibility,
    HumanResources,
}

/// Actions that move an application, used in transition errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Screen,
    ScheduleInterview,
    Accept,
    Reject,
    UpdateOnboarding,
    ConvertToStaff,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::ScheduleInterview => "schedule interview",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::UpdateOnboarding => "update onboarding",
            Self::ConvertToStaff => "convert to staff",
        }
    }
}

/// HR status action payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StatusAction {
    Screen,
    Interview { schedule: InterviewRequest },
    Accept,
    Reject {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl StatusAction {
    pub fn kind(&self) -> LifecycleAction {
        match self {
            Self::Screen => LifecycleAction::Screen,
            Self::Interview { .. } => LifecycleAction::ScheduleInterview,
            Self::Accept => LifecycleAction::Accept,
            Self::Reject { .. } => LifecycleAction::Reject,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {}: application is {from}", .action.label())]
    IllegalTransition {
        from: ApplicationStatus,
        action: LifecycleAction,
    },
    #[error("a rejection reason is required")]
    MissingRejectionReason,
}

impl TransitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            Self::MissingRejectionReason => ErrorKind::Validation,
        }
    }
}

impl ApplicationStage {
    /// Initial stage for a fresh submission.
    pub fn from_eligibility(decision: &EligibilityDecision) -> Self {
        match decision {
            EligibilityDecision::Admit => Self::Applied,
            EligibilityDecision::Reject(reason) => Self::Rejected {
                rejection: Rejection {
                    reason: reason.summary(),
                    source: RejectionSource::Eligibility,
                },
                schedule: None,
            },
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        match self {
            Self::Applied => ApplicationStatus::Applied,
            Self::Screening => ApplicationStatus::Screening,
            Self::Interview { .. } => ApplicationStatus::Interview,
            Self::Hired { .. } => ApplicationStatus::Hired,
            Self::Rejected { .. } => ApplicationStatus::Rejected,
        }
    }

    pub fn schedule(&self) -> Option<&InterviewSchedule> {
        match self {
            Self::Applied | Self::Screening => None,
            Self::Interview { schedule } => Some(schedule),
            Self::Hired { schedule, .. } | Self::Rejected { schedule, .. } => schedule.as_ref(),
        }
    }

    pub fn onboarding(&self) -> Option<&Onboarding> {
        match self {
            Self::Hired { onboarding, .. } => Some(onboarding),
            _ => None,
        }
    }

    pub fn onboarding_mut(&mut self) -> Option<&mut Onboarding> {
        match self {
            Self::Hired { onboarding, .. } => Some(onboarding),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected { rejection, .. } => Some(rejection),
            _ => None,
        }
    }

    /// Applied → Screening.
    pub fn screen(&self) -> Result<Self, TransitionError> {
        match self {
            Self::Applied => Ok(Self::Screening),
            other => Err(other.illegal(LifecycleAction::Screen)),
        }
    }

    /// Applied/Screening → Interview, or replace the slot of an application already in Interview.
    pub fn with_schedule(&self, schedule: InterviewSchedule) -> Result<Self, TransitionError> {
        match self {
            Self::Applied | Self::Screening | Self::Interview { .. } => {
                Ok(Self::Interview { schedule })
            }
            other => Err(other.illegal(LifecycleAction::ScheduleInterview)),
        }
    }

    /// Any non-terminal stage → Hired with a fresh onboarding checklist.
    pub fn accept(&self) -> Result<Self, TransitionError> {
        if self.status().is_terminal() {
            return Err(self.illegal(LifecycleAction::Accept));
        }

        Ok(Self::Hired {
            schedule: self.schedule().cloned(),
            onboarding: Onboarding::new(),
        })
    }

    /// Any non-terminal stage → Rejected. The reason must be non-blank.
    pub fn reject(&self, reason: Option<&str>) -> Result<Self, TransitionError> {
        if self.status().is_terminal() {
            return Err(self.illegal(LifecycleAction::Reject));
        }

        let reason = reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .ok_or(TransitionError::MissingRejectionReason)?;

        Ok(Self::Rejected {
            rejection: Rejection {
                reason: reason.to_string(),
                source: RejectionSource::HumanResources,
            },
            schedule: self.schedule().cloned(),
        })
    }

    pub(crate) fn illegal(&self, action: LifecycleAction) -> TransitionError {
        TransitionError::IllegalTransition {
            from: self.status(),
            action,
        }
    }
}

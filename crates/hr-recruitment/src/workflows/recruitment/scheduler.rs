use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    deserialize_optional_time, deserialize_time, serialize_optional_time, serialize_time,
    ErrorKind, InterviewMode, InterviewSchedule, InterviewVenue,
};
use super::lifecycle::{ApplicationStage, LifecycleAction, TransitionError};

/// Inbound interview details. `link_or_location` holds the meeting link for online interviews
/// and an optional room/address note for offline ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub date: NaiveDate,
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub start_time: NaiveTime,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_time",
        serialize_with = "serialize_optional_time"
    )]
    pub end_time: Option<NaiveTime>,
    pub mode: InterviewMode,
    pub interviewer_name: String,
    #[serde(default, alias = "link", alias = "location")]
    pub link_or_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchedulingError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("interview date {date} is in the past (today is {today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("link required for online interview")]
    MissingMeetingLink,
    #[error("interviewer name is required")]
    MissingInterviewer,
    #[error("interview end time {end} must be after start time {start}")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },
}

impl SchedulingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transition(err) => err.kind(),
            _ => ErrorKind::Validation,
        }
    }
}

/// Result of attaching a slot to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInterview {
    pub stage: ApplicationStage,
    pub rescheduled: bool,
}

/// Validate `request` and attach it to the application's stage.
///
/// The stage is checked first so a hired or rejected application reports an illegal transition
/// rather than a field problem. A second call replaces the slot without another status change.
pub fn schedule(
    stage: &ApplicationStage,
    request: InterviewRequest,
    today: NaiveDate,
) -> Result<ScheduledInterview, SchedulingError> {
    if stage.status().is_terminal() {
        return Err(stage.illegal(LifecycleAction::ScheduleInterview).into());
    }

    let schedule = validate_request(request, today)?;
    let rescheduled = stage.schedule().is_some();
    let stage = stage.with_schedule(schedule)?;

    Ok(ScheduledInterview { stage, rescheduled })
}

pub fn validate_request(
    request: InterviewRequest,
    today: NaiveDate,
) -> Result<InterviewSchedule, SchedulingError> {
    let InterviewRequest {
        date,
        start_time,
        end_time,
        mode,
        interviewer_name,
        link_or_location,
        notes,
    } = request;

    if date < today {
        return Err(SchedulingError::DateInPast { date, today });
    }

    let interviewer_name = interviewer_name.trim().to_string();
    if interviewer_name.is_empty() {
        return Err(SchedulingError::MissingInterviewer);
    }

    if let Some(end) = end_time {
        if end <= start_time {
            return Err(SchedulingError::EndBeforeStart {
                start: start_time,
                end,
            });
        }
    }

    let link_or_location = non_blank(link_or_location);
    let venue = match mode {
        InterviewMode::Online => InterviewVenue::Online {
            meeting_link: link_or_location.ok_or(SchedulingError::MissingMeetingLink)?,
        },
        InterviewMode::Offline => InterviewVenue::Offline {
            location: link_or_location,
        },
    };

    Ok(InterviewSchedule {
        date,
        start_time,
        end_time,
        venue,
        interviewer_name,
        notes: non_blank(notes),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for organizational divisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DivisionId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DivisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Highest completed education, ordered from primary school to doctorate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "SMP")]
    Smp,
    #[serde(rename = "SMA/SMK", alias = "SMA", alias = "SMK")]
    SmaSmk,
    #[serde(rename = "D3")]
    D3,
    #[serde(rename = "D4")]
    D4,
    #[serde(rename = "S1")]
    S1,
    #[serde(rename = "S2")]
    S2,
    #[serde(rename = "S3")]
    S3,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sd => "SD",
            Self::Smp => "SMP",
            Self::SmaSmk => "SMA/SMK",
            Self::D3 => "D3",
            Self::D4 => "D4",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
        }
    }
}

/// Contact details carried into the staff account once the applicant is converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContact {
    pub name: String,
    pub email: String,
}

/// Eligibility-relevant facts captured at submission time.
///
/// The snapshot is stored with the application and never refreshed from later profile edits,
/// so a past admit/reject decision can always be replayed against the same facts. Missing
/// fields fail whichever criterion needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub education: Option<EducationLevel>,
    #[serde(default)]
    pub experience_years: Option<u8>,
}

/// Inbound submission: who is applying, their profile facts, and the posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub candidate: CandidateContact,
    pub profile: ProfileSnapshot,
    pub job_id: JobId,
}

/// Status tracked throughout the recruitment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Applied,
            Self::Screening,
            Self::Interview,
            Self::Hired,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interview => "interview",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure classes reported to callers. None of them leave partial state behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    IllegalTransition,
    CapacityExceeded,
    PreconditionNotMet,
    NotFound,
    Unavailable,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::IllegalTransition => "illegal_transition",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::PreconditionNotMet => "precondition_not_met",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Online,
    Offline,
}

/// Where the interview happens. Online interviews always carry a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InterviewVenue {
    Online { meeting_link: String },
    Offline { location: Option<String> },
}

impl InterviewVenue {
    pub fn mode(&self) -> InterviewMode {
        match self {
            Self::Online { .. } => InterviewMode::Online,
            Self::Offline { .. } => InterviewMode::Offline,
        }
    }
}

/// The single live interview slot attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewSchedule {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub start_time: NaiveTime,
    #[serde(
        serialize_with = "serialize_optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<NaiveTime>,
    pub venue: InterviewVenue,
    pub interviewer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}

pub(crate) fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_time<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_time(&value).map_err(serde::de::Error::custom))
        .transpose()
}

pub(crate) fn serialize_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

pub(crate) fn serialize_optional_time<S>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match time {
        Some(time) => serialize_time(time, serializer),
        None => serializer.serialize_none(),
    }
}

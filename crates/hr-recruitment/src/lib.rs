//! Recruitment and onboarding lifecycle engine for the HR back-office.
//!
//! The [`workflows::recruitment`] module owns the applicant pipeline: eligibility screening,
//! status transitions, interview scheduling, onboarding checklists and the division capacity
//! guard that authorizes conversion into staff accounts.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

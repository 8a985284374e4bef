use chrono::{DateTime, Utc};
use serde::Serialize;

use super::checklist::{Checklist, ChecklistEntry, ChecklistError, ChecklistItem};
use super::domain::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingItem {
    ContractSigned,
    InventoryHandover,
    TrainingOrientation,
}

impl ChecklistItem for OnboardingItem {
    const ALL: &'static [Self] = &[
        Self::ContractSigned,
        Self::InventoryHandover,
        Self::TrainingOrientation,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::ContractSigned => "contract_signed",
            Self::InventoryHandover => "inventory_handover",
            Self::TrainingOrientation => "training_orientation",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::ContractSigned => "Contract signed",
            Self::InventoryHandover => "Inventory handover",
            Self::TrainingOrientation => "Training & orientation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    InProgress,
    Selesai,
}

impl OnboardingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Selesai => "Selesai",
        }
    }
}

/// Onboarding state owned by a hired application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Onboarding {
    checklist: Checklist<OnboardingItem>,
    converted_at: Option<DateTime<Utc>>,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new()
    }
}

impl Onboarding {
    pub fn new() -> Self {
        Self {
            checklist: Checklist::new(),
            converted_at: None,
        }
    }

    pub fn checklist(&self) -> &Checklist<OnboardingItem> {
        &self.checklist
    }

    pub fn progress_percent(&self) -> u8 {
        self.checklist.progress_percent()
    }

    pub fn status(&self) -> OnboardingStatus {
        if self.checklist.is_complete() {
            OnboardingStatus::Selesai
        } else {
            OnboardingStatus::InProgress
        }
    }

    pub fn is_converted_to_staff(&self) -> bool {
        self.converted_at.is_some()
    }

    pub fn converted_at(&self) -> Option<DateTime<Utc>> {
        self.converted_at
    }

    /// Toggle one item and return the recomputed progress.
    pub fn toggle(&mut self, item_name: &str, done: bool) -> Result<u8, OnboardingError> {
        self.ensure_open()?;
        Ok(self.checklist.set_named(item_name, done)?)
    }

    /// Marking onboarding finished completes the checklist itself; progress cannot reach 100
    /// any other way.
    pub fn mark_complete(&mut self) -> Result<u8, OnboardingError> {
        self.ensure_open()?;
        self.checklist.mark_all();
        Ok(self.progress_percent())
    }

    pub fn ensure_convertible(&self) -> Result<(), OnboardingError> {
        self.ensure_open()?;
        if !self.checklist.is_complete() {
            return Err(OnboardingError::ChecklistIncomplete {
                completed: self.checklist.completed(),
                total: self.checklist.total(),
            });
        }
        Ok(())
    }

    pub fn mark_converted(&mut self, at: DateTime<Utc>) -> Result<(), OnboardingError> {
        self.ensure_convertible()?;
        self.converted_at = Some(at);
        Ok(())
    }

    pub fn view(&self) -> OnboardingView {
        let status = self.status();
        OnboardingView {
            status,
            status_label: status.label(),
            progress_percent: self.progress_percent(),
            items: self.checklist.entries(),
            converted_to_staff: self.is_converted_to_staff(),
            converted_at: self.converted_at(),
        }
    }

    fn ensure_open(&self) -> Result<(), OnboardingError> {
        if self.is_converted_to_staff() {
            return Err(OnboardingError::AlreadyConverted);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingView {
    pub status: OnboardingStatus,
    pub status_label: &'static str,
    pub progress_percent: u8,
    pub items: Vec<ChecklistEntry<OnboardingItem>>,
    pub converted_to_staff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error("checklist incomplete: {completed} of {total} items done")]
    ChecklistIncomplete { completed: usize, total: usize },
    #[error("applicant already converted to staff")]
    AlreadyConverted,
}

impl OnboardingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Checklist(_) => ErrorKind::Validation,
            Self::ChecklistIncomplete { .. } | Self::AlreadyConverted => {
                ErrorKind::PreconditionNotMet
            }
        }
    }
}

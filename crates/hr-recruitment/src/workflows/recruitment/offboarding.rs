//! Exit checklist for departing staff. Finishing the checklist frees the member's division slot.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::capacity::{CapacityError, DivisionRegistry};
use super::checklist::{Checklist, ChecklistEntry, ChecklistError, ChecklistItem};
use super::domain::{DivisionId, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffboardingId(pub String);

impl fmt::Display for OffboardingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static OFFBOARDING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_offboarding_id() -> OffboardingId {
    let id = OFFBOARDING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OffboardingId(format!("off-{id:06}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffboardingItem {
    ExitInterview,
    AssetReturn,
    AccessRevoked,
    FinalSettlement,
}

impl ChecklistItem for OffboardingItem {
    const ALL: &'static [Self] = &[
        Self::ExitInterview,
        Self::AssetReturn,
        Self::AccessRevoked,
        Self::FinalSettlement,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::ExitInterview => "exit_interview",
            Self::AssetReturn => "asset_return",
            Self::AccessRevoked => "access_revoked",
            Self::FinalSettlement => "final_settlement",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::ExitInterview => "Exit interview",
            Self::AssetReturn => "Asset return",
            Self::AccessRevoked => "Access revoked",
            Self::FinalSettlement => "Final settlement",
        }
    }
}

/// Derived from the checklist: nothing done, some done, everything done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffboardingStatus {
    Diajukan,
    Proses,
    Selesai,
}

impl OffboardingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diajukan => "Diajukan",
            Self::Proses => "Proses",
            Self::Selesai => "Selesai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffboardingRequest {
    pub division_id: DivisionId,
    pub employee_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffboardingRecord {
    pub id: OffboardingId,
    pub division_id: DivisionId,
    pub employee_name: String,
    pub position: Option<String>,
    pub reason: Option<String>,
    checklist: Checklist<OffboardingItem>,
    slot_released: bool,
    pub submitted_at: DateTime<Utc>,
}

impl OffboardingRecord {
    pub fn status(&self) -> OffboardingStatus {
        if self.checklist.is_complete() {
            OffboardingStatus::Selesai
        } else if self.checklist.is_untouched() {
            OffboardingStatus::Diajukan
        } else {
            OffboardingStatus::Proses
        }
    }

    pub fn checklist(&self) -> &Checklist<OffboardingItem> {
        &self.checklist
    }

    pub fn slot_released(&self) -> bool {
        self.slot_released
    }

    pub fn view(&self) -> OffboardingView {
        let status = self.status();
        OffboardingView {
            id: self.id.clone(),
            division_id: self.division_id.clone(),
            employee_name: self.employee_name.clone(),
            position: self.position.clone(),
            reason: self.reason.clone(),
            status,
            status_label: status.label(),
            progress_percent: self.checklist.progress_percent(),
            items: self.checklist.entries(),
            slot_released: self.slot_released,
            submitted_at: self.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffboardingView {
    pub id: OffboardingId,
    pub division_id: DivisionId,
    pub employee_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: OffboardingStatus,
    pub status_label: &'static str,
    pub progress_percent: u8,
    pub items: Vec<ChecklistEntry<OffboardingItem>>,
    pub slot_released: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OffboardingError {
    #[error("employee name is required")]
    MissingEmployee,
    #[error("offboarding {0} not found")]
    NotFound(OffboardingId),
    #[error("offboarding {0} is already finished")]
    Closed(OffboardingId),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

impl OffboardingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingEmployee | Self::Checklist(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Closed(_) => ErrorKind::PreconditionNotMet,
            Self::Capacity(err) => err.kind(),
        }
    }
}

/// In-memory offboarding store. Lock order is tracker first, then the division.
#[derive(Debug)]
pub struct OffboardingTracker {
    records: Mutex<HashMap<OffboardingId, OffboardingRecord>>,
    divisions: Arc<DivisionRegistry>,
}

impl OffboardingTracker {
    pub fn new(divisions: Arc<DivisionRegistry>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            divisions,
        }
    }

    /// Open an offboarding for a current staff member of `division_id`.
    pub fn begin(
        &self,
        request: OffboardingRequest,
        now: DateTime<Utc>,
    ) -> Result<OffboardingView, OffboardingError> {
        let employee_name = request.employee_name.trim().to_string();
        if employee_name.is_empty() {
            return Err(OffboardingError::MissingEmployee);
        }

        let division = self.divisions.get(&request.division_id)?;
        if division.current_staff_count == 0 {
            return Err(CapacityError::NoStaffToRelease(division.id).into());
        }

        let record = OffboardingRecord {
            id: next_offboarding_id(),
            division_id: request.division_id,
            employee_name,
            position: request.position,
            reason: request.reason,
            checklist: Checklist::new(),
            slot_released: false,
            submitted_at: now,
        };
        let view = record.view();
        info!(
            offboarding = %record.id,
            division = %record.division_id,
            "offboarding submitted"
        );
        self.lock().insert(record.id.clone(), record);
        Ok(view)
    }

    pub fn get(&self, id: &OffboardingId) -> Result<OffboardingView, OffboardingError> {
        self.lock()
            .get(id)
            .map(OffboardingRecord::view)
            .ok_or_else(|| OffboardingError::NotFound(id.clone()))
    }

    pub fn toggle_item(
        &self,
        id: &OffboardingId,
        item_name: &str,
        done: bool,
    ) -> Result<OffboardingView, OffboardingError> {
        self.update(id, |checklist| {
            checklist.set_named(item_name, done)?;
            Ok(())
        })
    }

    /// Force every item done, finishing the offboarding.
    pub fn mark_complete(&self, id: &OffboardingId) -> Result<OffboardingView, OffboardingError> {
        self.update(id, |checklist| {
            checklist.mark_all();
            Ok(())
        })
    }

    fn update<F>(&self, id: &OffboardingId, change: F) -> Result<OffboardingView, OffboardingError>
    where
        F: FnOnce(&mut Checklist<OffboardingItem>) -> Result<(), OffboardingError>,
    {
        let mut records = self.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| OffboardingError::NotFound(id.clone()))?;
        if record.slot_released() {
            return Err(OffboardingError::Closed(id.clone()));
        }

        let mut draft = record.clone();
        change(&mut draft.checklist)?;

        if draft.checklist.is_complete() {
            let division = self
                .divisions
                .critical_section(&draft.division_id, |division| {
                    division.release_staff()?;
                    Ok::<_, CapacityError>(division.view())
                })?;
            draft.slot_released = true;
            info!(
                offboarding = %draft.id,
                division = %division.id,
                available_slots = division.available_slots,
                "offboarding finished; division slot released"
            );
        }

        *record = draft;
        Ok(record.view())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OffboardingId, OffboardingRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recruitment::capacity::Division;

    fn tracker(staff: u32) -> (OffboardingTracker, Arc<DivisionRegistry>, DivisionId) {
        let registry = Arc::new(DivisionRegistry::new());
        let id = DivisionId("div-it".to_string());
        registry
            .register(Division::new(id.clone(), "IT", 5, staff).expect("valid division"))
            .expect("registered");
        (OffboardingTracker::new(registry.clone()), registry, id)
    }

    fn request(division_id: &DivisionId) -> OffboardingRequest {
        OffboardingRequest {
            division_id: division_id.clone(),
            employee_name: "Dewi Lestari".to_string(),
            position: Some("Network Engineer".to_string()),
            reason: Some("Relocation".to_string()),
        }
    }

    #[test]
    fn status_moves_from_diajukan_through_proses_to_selesai() {
        let (tracker, registry, division) = tracker(3);
        let view = tracker.begin(request(&division), Utc::now()).expect("begins");
        assert_eq!(view.status, OffboardingStatus::Diajukan);
        assert_eq!(view.progress_percent, 0);

        let view = tracker
            .toggle_item(&view.id, "exit_interview", true)
            .expect("known item");
        assert_eq!(view.status, OffboardingStatus::Proses);
        assert_eq!(view.progress_percent, 25);

        for item in ["asset_return", "Access revoked", "final_settlement"] {
            tracker.toggle_item(&view.id, item, true).expect("known item");
        }
        let finished = tracker.get(&view.id).expect("exists");
        assert_eq!(finished.status, OffboardingStatus::Selesai);
        assert!(finished.slot_released);
        assert_eq!(
            registry.get(&division).expect("known").current_staff_count,
            2
        );
    }

    #[test]
    fn slot_is_released_exactly_once() {
        let (tracker, registry, division) = tracker(1);
        let view = tracker.begin(request(&division), Utc::now()).expect("begins");

        tracker.mark_complete(&view.id).expect("completes");
        assert_eq!(
            tracker.mark_complete(&view.id),
            Err(OffboardingError::Closed(view.id.clone()))
        );
        assert_eq!(
            tracker.toggle_item(&view.id, "asset_return", false),
            Err(OffboardingError::Closed(view.id.clone()))
        );
        assert_eq!(
            registry.get(&division).expect("known").current_staff_count,
            0
        );
    }

    #[test]
    fn empty_division_cannot_start_offboarding() {
        let (tracker, _, division) = tracker(0);
        assert!(matches!(
            tracker.begin(request(&division), Utc::now()),
            Err(OffboardingError::Capacity(CapacityError::NoStaffToRelease(_)))
        ));
    }

    #[test]
    fn failed_release_keeps_checklist_state() {
        let (tracker, registry, division) = tracker(1);
        let first = tracker.begin(request(&division), Utc::now()).expect("begins");
        let second = tracker.begin(request(&division), Utc::now()).expect("begins");

        tracker.mark_complete(&first.id).expect("first completes");
        assert!(matches!(
            tracker.mark_complete(&second.id),
            Err(OffboardingError::Capacity(CapacityError::NoStaffToRelease(_)))
        ));

        let second = tracker.get(&second.id).expect("exists");
        assert_eq!(second.status, OffboardingStatus::Diajukan);
        assert!(!second.slot_released);
        assert_eq!(
            registry.get(&division).expect("known").current_staff_count,
            0
        );
    }

    #[test]
    fn unknown_records_and_items_are_reported() {
        let (tracker, _, division) = tracker(2);
        assert!(matches!(
            tracker.get(&OffboardingId("off-999999".to_string())),
            Err(OffboardingError::NotFound(_))
        ));
        let view = tracker.begin(request(&division), Utc::now()).expect("begins");
        assert!(matches!(
            tracker.toggle_item(&view.id, "laptop", true),
            Err(OffboardingError::Checklist(_))
        ));
    }
}

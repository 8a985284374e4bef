//! Division headcount and the capacity guard shared by job openings and staff conversions.
//!
//! Every guarded action runs inside [`DivisionRegistry::critical_section`], which holds the
//! division's own mutex while the check and the headcount change are applied. Two callers racing
//! for the last slot of the same division are therefore serialized.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;

use super::domain::{DivisionId, ErrorKind};

/// Division headcount. `available_slots` is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    capacity: u32,
    current_staff_count: u32,
}

impl Division {
    pub fn new(
        id: DivisionId,
        name: impl Into<String>,
        capacity: u32,
        current_staff_count: u32,
    ) -> Result<Self, CapacityError> {
        if capacity < current_staff_count {
            return Err(CapacityError::CapacityBelowHeadcount {
                division: id,
                requested: capacity,
                current_staff: current_staff_count,
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            capacity,
            current_staff_count,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_staff_count(&self) -> u32 {
        self.current_staff_count
    }

    pub fn available_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.current_staff_count)
    }

    pub fn can_open_job(&self) -> bool {
        self.available_slots() > 0
    }

    pub fn can_add_staff(&self) -> bool {
        self.available_slots() > 0
    }

    pub fn ensure_can_open_job(&self) -> Result<(), CapacityError> {
        if self.can_open_job() {
            Ok(())
        } else {
            Err(self.exceeded())
        }
    }

    pub fn set_capacity(&mut self, capacity: u32) -> Result<(), CapacityError> {
        if capacity < self.current_staff_count {
            return Err(CapacityError::CapacityBelowHeadcount {
                division: self.id.clone(),
                requested: capacity,
                current_staff: self.current_staff_count,
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Consume one slot for a new staff member.
    pub fn admit_staff(&mut self) -> Result<(), CapacityError> {
        if !self.can_add_staff() {
            return Err(self.exceeded());
        }
        self.current_staff_count += 1;
        Ok(())
    }

    /// Free one slot after a staff member leaves.
    pub fn release_staff(&mut self) -> Result<(), CapacityError> {
        if self.current_staff_count == 0 {
            return Err(CapacityError::NoStaffToRelease(self.id.clone()));
        }
        self.current_staff_count -= 1;
        Ok(())
    }

    pub fn view(&self) -> DivisionView {
        DivisionView {
            id: self.id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
            current_staff_count: self.current_staff_count,
            available_slots: self.available_slots(),
        }
    }

    fn exceeded(&self) -> CapacityError {
        CapacityError::CapacityExceeded {
            division: self.id.clone(),
            capacity: self.capacity,
            current_staff: self.current_staff_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionView {
    pub id: DivisionId,
    pub name: String,
    pub capacity: u32,
    pub current_staff_count: u32,
    pub available_slots: u32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("division {0} not found")]
    UnknownDivision(DivisionId),
    #[error("division {0} already registered")]
    DuplicateDivision(DivisionId),
    #[error(
        "capacity exceeded: division {division} has {current_staff} of {capacity} slots filled"
    )]
    CapacityExceeded {
        division: DivisionId,
        capacity: u32,
        current_staff: u32,
    },
    #[error(
        "capacity {requested} for division {division} is below its current staff count {current_staff}"
    )]
    CapacityBelowHeadcount {
        division: DivisionId,
        requested: u32,
        current_staff: u32,
    },
    #[error("division {0} has no staff left to release")]
    NoStaffToRelease(DivisionId),
}

impl CapacityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownDivision(_) => ErrorKind::NotFound,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::CapacityBelowHeadcount { .. } => ErrorKind::Validation,
            Self::DuplicateDivision(_) | Self::NoStaffToRelease(_) => ErrorKind::PreconditionNotMet,
        }
    }
}

/// In-memory division store with one mutex per division.
#[derive(Debug, Default)]
pub struct DivisionRegistry {
    divisions: RwLock<HashMap<DivisionId, Arc<Mutex<Division>>>>,
}

impl DivisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, division: Division) -> Result<DivisionView, CapacityError> {
        let mut divisions = self
            .divisions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if divisions.contains_key(&division.id) {
            return Err(CapacityError::DuplicateDivision(division.id));
        }
        let view = division.view();
        divisions.insert(division.id.clone(), Arc::new(Mutex::new(division)));
        Ok(view)
    }

    /// Register a batch under a single write lock. Either every division is added or none is.
    pub fn register_all(
        &self,
        batch: Vec<Division>,
    ) -> Result<Vec<DivisionView>, CapacityError> {
        let mut divisions = self
            .divisions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut incoming = HashSet::with_capacity(batch.len());
        for division in &batch {
            if divisions.contains_key(&division.id) || !incoming.insert(&division.id) {
                return Err(CapacityError::DuplicateDivision(division.id.clone()));
            }
        }

        Ok(batch
            .into_iter()
            .map(|division| {
                let view = division.view();
                divisions.insert(division.id.clone(), Arc::new(Mutex::new(division)));
                view
            })
            .collect())
    }

    pub fn get(&self, id: &DivisionId) -> Result<DivisionView, CapacityError> {
        let slot = self.slot(id)?;
        let division = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(division.view())
    }

    pub fn list(&self) -> Vec<DivisionView> {
        let slots: Vec<Arc<Mutex<Division>>> = self
            .divisions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut views: Vec<DivisionView> = slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).view())
            .collect();
        views.sort_by(|a, b| a.id.cmp(&b.id));
        views
    }

    pub fn set_capacity(
        &self,
        id: &DivisionId,
        capacity: u32,
    ) -> Result<DivisionView, CapacityError> {
        self.critical_section(id, |division| {
            division.set_capacity(capacity)?;
            Ok(division.view())
        })
    }

    /// Run `action` against a draft copy of the division while holding its lock.
    ///
    /// The draft replaces the stored division only when `action` succeeds, so a failing action
    /// (including one whose own follow-up writes fail) leaves the headcount untouched.
    pub fn critical_section<T, E, F>(&self, id: &DivisionId, action: F) -> Result<T, E>
    where
        F: FnOnce(&mut Division) -> Result<T, E>,
        E: From<CapacityError>,
    {
        let slot = self.slot(id)?;
        let mut division = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let mut draft = division.clone();
        let value = action(&mut draft)?;
        *division = draft;
        Ok(value)
    }

    fn slot(&self, id: &DivisionId) -> Result<Arc<Mutex<Division>>, CapacityError> {
        self.divisions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| CapacityError::UnknownDivision(id.clone()))
    }
}

use std::fmt;

use serde::Serialize;

/// A fixed, ordered set of named steps. Implemented by the onboarding and offboarding item enums.
pub trait ChecklistItem: Copy + Eq + fmt::Debug + Serialize + Send + Sync + 'static {
    /// Every item, in display order.
    const ALL: &'static [Self];

    /// Stable machine key, e.g. `contract_signed`.
    fn key(self) -> &'static str;

    /// Human readable label.
    fn label(self) -> &'static str;

    /// Accepts either the key or the label, ignoring case and surrounding whitespace.
    fn parse(name: &str) -> Option<Self> {
        let needle = name.trim();
        Self::ALL.iter().copied().find(|item| {
            item.key().eq_ignore_ascii_case(needle) || item.label().eq_ignore_ascii_case(needle)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry<I: ChecklistItem> {
    pub item: I,
    pub label: &'static str,
    pub done: bool,
}

/// Boolean state for every item of `I`. Progress is computed from this state on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist<I: ChecklistItem> {
    entries: Vec<(I, bool)>,
}

impl<I: ChecklistItem> Default for Checklist<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ChecklistItem> Checklist<I> {
    /// All items present, none done.
    pub fn new() -> Self {
        Self {
            entries: I::ALL.iter().map(|item| (*item, false)).collect(),
        }
    }

    pub fn set(&mut self, item: I, done: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|(known, _)| *known == item) {
            entry.1 = done;
        }
    }

    /// Set an item by key or label and return the recomputed progress.
    pub fn set_named(&mut self, name: &str, done: bool) -> Result<u8, ChecklistError> {
        let item = I::parse(name).ok_or_else(|| ChecklistError::UnknownItem {
            name: name.to_string(),
            expected: I::ALL.iter().map(|item| item.key()).collect(),
        })?;
        self.set(item, done);
        Ok(self.progress_percent())
    }

    pub fn mark_all(&mut self) {
        for entry in &mut self.entries {
            entry.1 = true;
        }
    }

    pub fn is_done(&self, item: I) -> bool {
        self.entries
            .iter()
            .any(|(known, done)| *known == item && *done)
    }

    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|(_, done)| *done).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total()
    }

    pub fn is_untouched(&self) -> bool {
        self.completed() == 0
    }

    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.completed(), self.total())
    }

    pub fn entries(&self) -> Vec<ChecklistEntry<I>> {
        self.entries
            .iter()
            .map(|(item, done)| ChecklistEntry {
                item: *item,
                label: item.label(),
                done: *done,
            })
            .collect()
    }
}

/// `round(100 * completed / total)` with halves rounded up; an empty list counts as done.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("unknown checklist item '{name}' (expected one of: {})", .expected.join(", "))]
    UnknownItem {
        name: String,
        expected: Vec<&'static str>,
    },
}

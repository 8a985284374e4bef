//! Division roster import: seeds the capacity registry from a CSV export with the columns
//! `Division,Name,Capacity,Current Staff`.

mod parser;

use crate::workflows::recruitment::{
    CapacityError, Division, DivisionId, DivisionRegistry, DivisionView,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use parser::RosterRecord;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingDivisionId { line: usize },
    DuplicateDivision { line: usize, division: String },
    Capacity { line: usize, source: CapacityError },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read division roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid division roster CSV: {}", err),
            RosterImportError::MissingDivisionId { line } => {
                write!(f, "roster line {} has no division id", line)
            }
            RosterImportError::DuplicateDivision { line, division } => write!(
                f,
                "roster line {} repeats division {}",
                line, division
            ),
            RosterImportError::Capacity { line, source } => {
                write!(f, "roster line {} is invalid: {}", line, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Capacity { source, .. } => Some(source),
            RosterImportError::MissingDivisionId { .. }
            | RosterImportError::DuplicateDivision { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Validated roster, ready to seed a [`DivisionRegistry`].
#[derive(Debug, Clone)]
pub struct DivisionRosterImporter {
    divisions: Vec<Division>,
}

impl DivisionRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RosterImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterImportError> {
        let records = parser::parse_records(reader)?;
        let divisions = build_divisions(records)?;
        Ok(Self { divisions })
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn views(&self) -> Vec<DivisionView> {
        self.divisions.iter().map(Division::view).collect()
    }

    /// Register every division. Nothing is registered when the registry already knows any of them.
    pub fn seed_registry(
        &self,
        registry: &DivisionRegistry,
    ) -> Result<Vec<DivisionView>, RosterImportError> {
        registry
            .register_all(self.divisions.clone())
            .map_err(|source| {
                let index = match &source {
                    CapacityError::DuplicateDivision(id) => self
                        .divisions
                        .iter()
                        .position(|division| &division.id == id)
                        .unwrap_or_default(),
                    _ => 0,
                };
                RosterImportError::Capacity {
                    line: index + 2,
                    source,
                }
            })
    }
}

fn build_divisions(records: Vec<RosterRecord>) -> Result<Vec<Division>, RosterImportError> {
    let mut seen = HashSet::new();
    let mut divisions = Vec::with_capacity(records.len());

    for record in records {
        if record.division_id.is_empty() {
            return Err(RosterImportError::MissingDivisionId { line: record.line });
        }
        if !seen.insert(record.division_id.clone()) {
            return Err(RosterImportError::DuplicateDivision {
                line: record.line,
                division: record.division_id,
            });
        }

        let division = Division::new(
            DivisionId(record.division_id),
            record.name,
            record.capacity,
            record.current_staff,
        )
        .map_err(|source| RosterImportError::Capacity {
            line: record.line,
            source,
        })?;
        divisions.push(division);
    }

    Ok(divisions)
}

use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One division row as it appears in the roster export, 1-based `line` including the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RosterRecord {
    pub(crate) line: usize,
    pub(crate) division_id: String,
    pub(crate) name: String,
    pub(crate) capacity: u32,
    pub(crate) current_staff: u32,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = record?;
        records.push(RosterRecord {
            line: index + 2,
            name: row.name.unwrap_or_else(|| row.division.clone()),
            division_id: row.division,
            capacity: row.capacity,
            current_staff: row.current_staff.unwrap_or(0),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Division")]
    division: String,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(
        rename = "Current Staff",
        default,
        deserialize_with = "empty_string_as_zero"
    )]
    current_staff: Option<u32>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn empty_string_as_zero<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().parse::<u32>().map_err(serde::de::Error::custom))
        .transpose()
}

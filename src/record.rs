use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One planned all-day event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEventRecord {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl SourceEventRecord {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        SourceEventRecord {
            name: name.into(),
            date,
            description: None,
            location: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Date in the `YYYY-MM-DD` form the Calendar API uses for all-day events
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Deserialize)]
struct RecordFile {
    #[serde(default)]
    events: Vec<SourceEventRecord>,
}

/// Load source records from a `.json` (array) or `.toml` (`[[events]]`) file.
///
/// Records are returned in file order. They are expected to be sorted by date;
/// an out-of-order file is logged but left untouched.
pub fn load_records(path: &Path) -> Result<Vec<SourceEventRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file at {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records: Vec<SourceEventRecord> = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse events file at {}", path.display()))?
    } else {
        toml::from_str::<RecordFile>(&contents)
            .with_context(|| format!("Failed to parse events file at {}", path.display()))?
            .events
    };

    if records.windows(2).any(|pair| pair[0].date > pair[1].date) {
        tracing::warn!(
            path = %path.display(),
            "events are not sorted by date; the duplicate search window uses the first and last entries"
        );
    }

    Ok(records)
}

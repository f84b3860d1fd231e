//! .ics export of source records.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::record::SourceEventRecord;

pub const ICS_EXTENSION: &str = ".ics";

/// Generate a calendar with one all-day VEVENT per record.
///
/// Every event gets `location` in place of the record's own location.
pub fn generate_ics(records: &[SourceEventRecord], location: &str) -> Result<String> {
    let mut cal = Calendar::new();

    for record in records {
        let end = record
            .date
            .checked_add_days(Days::new(1))
            .with_context(|| format!("Event date out of range: {}", record.date))?;

        let mut ics_event = icalendar::Event::new();
        ics_event.summary(&record.name);
        add_date_property(&mut ics_event, "DTSTART", record.date);
        add_date_property(&mut ics_event, "DTEND", end);

        if let Some(ref desc) = record.description {
            ics_event.description(desc);
        }
        ics_event.location(location);

        cal.push(ics_event.done());
    }

    Ok(cal.done().to_string())
}

/// Add a `VALUE=DATE` property, which is what marks an event all-day
fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

/// `path` with `.ics` appended unless it already ends with it
pub fn ics_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    if !path.to_string_lossy().ends_with(ICS_EXTENSION) {
        raw.push(ICS_EXTENSION);
    }
    PathBuf::from(raw)
}

/// Write records to an .ics file and return the path written.
///
/// The bytes go out exactly as generated (CRLF line endings, nothing added),
/// since some consumers reject files with stray carriage returns.
pub fn write_file(records: &[SourceEventRecord], path: &Path, location: &str) -> Result<PathBuf> {
    let path = ics_path(path);
    print!("Writing ICS file '{}'... ", path.display());
    std::io::Write::flush(&mut std::io::stdout()).ok();

    let content = generate_ics(records, location)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&path, content.as_bytes())
        .with_context(|| format!("Failed to write ICS file at {}", path.display()))?;

    println!("Done");
    tracing::debug!(path = %path.display(), events = records.len(), "wrote ics file");
    Ok(path)
}

//! Finding remote events that repeat the source records.
//!
//! A remote event counts as a duplicate when its all-day start date is one of
//! the source dates and its summary is one of the source names. The two
//! checks are made against the whole record list independently, so a date
//! from one record and a name from another is enough to match.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

use crate::api::{CalendarApi, EventQuery};
use crate::directory::CalendarDirectory;
use crate::error::KcalError;
use crate::record::SourceEventRecord;

/// A matched remote event and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub calendar_name: String,
    pub calendar_id: String,
    pub event_id: String,
}

/// Midnight UTC of the first record's date up to midnight UTC of the day
/// after the last record's date.
///
/// Records are assumed sorted by date; the first and last entries are used.
pub fn covering_window(records: &[SourceEventRecord]) -> Result<EventQuery> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(KcalError::NoSourceRecords.into()),
    };

    let day_after = last
        .date
        .checked_add_days(Days::new(1))
        .context("Last event date is out of range")?;

    Ok(EventQuery {
        time_min: start_of_day_utc(first.date),
        time_max: start_of_day_utc(day_after),
    })
}

fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

pub struct DuplicateFinder<'a, A> {
    api: &'a A,
    directory: &'a CalendarDirectory,
}

impl<'a, A: CalendarApi> DuplicateFinder<'a, A> {
    pub fn new(api: &'a A, directory: &'a CalendarDirectory) -> Self {
        DuplicateFinder { api, directory }
    }

    /// Ids of duplicate events across `calendar_names`, in discovery order.
    ///
    /// `None` means a calendar name was not found; the search stops there.
    pub async fn find_duplicate_ids(
        &self,
        records: &[SourceEventRecord],
        calendar_names: &[String],
    ) -> Result<Option<Vec<String>>> {
        Ok(self
            .find_duplicates(records, calendar_names)
            .await?
            .map(|found| found.into_iter().map(|d| d.event_id).collect()))
    }

    pub async fn find_duplicates(
        &self,
        records: &[SourceEventRecord],
        calendar_names: &[String],
    ) -> Result<Option<Vec<Duplicate>>> {
        let query = covering_window(records)?;

        let source_dates: HashSet<String> = records.iter().map(|r| r.date_key()).collect();
        let source_names: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();

        let mut found = Vec::new();

        for calendar_name in calendar_names {
            let Some(calendar_id) = self.directory.get(calendar_name) else {
                println!("Calendar '{}' not found", calendar_name);
                return Ok(None);
            };

            print!("Collecting event ids from calendar '{}'... ", calendar_name);
            std::io::stdout().flush().ok();

            let mut page_token: Option<String> = None;
            loop {
                let page = self
                    .api
                    .list_events(calendar_id, &query, page_token.as_deref())
                    .await
                    .with_context(|| format!("Failed to list events in '{}'", calendar_name))?;

                for event in page.items {
                    let date_matches = event
                        .start_date_key()
                        .is_some_and(|date| source_dates.contains(&date));
                    let name_matches = event
                        .summary
                        .as_deref()
                        .is_some_and(|summary| source_names.contains(summary));

                    if date_matches && name_matches {
                        tracing::debug!(calendar = %calendar_name, event_id = %event.id, "duplicate");
                        found.push(Duplicate {
                            calendar_name: calendar_name.clone(),
                            calendar_id: calendar_id.to_string(),
                            event_id: event.id,
                        });
                    }
                }

                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            println!("Done");
        }

        Ok(Some(found))
    }
}

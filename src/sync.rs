//! Deleting duplicates and uploading source records as all-day events.

use anyhow::{Context, Result};
use chrono::Days;
use chrono_tz::Tz;

use crate::api::{CalendarApi, EventDateTime, NewEvent};
use crate::directory::CalendarDirectory;
use crate::duplicates::{Duplicate, DuplicateFinder};
use crate::record::SourceEventRecord;

/// What the delete phase did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NoDuplicates,
    /// Aborted before deleting anything
    CalendarNotFound(String),
    Deleted(usize),
}

/// What the upload phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub created: usize,
    /// Requested calendars that were skipped
    pub missing: Vec<String>,
}

pub struct EventSynchronizer<'a, A> {
    api: &'a A,
    directory: &'a CalendarDirectory,
    time_zone: Tz,
}

impl<'a, A: CalendarApi> EventSynchronizer<'a, A> {
    pub fn new(api: &'a A, directory: &'a CalendarDirectory, time_zone: Tz) -> Self {
        EventSynchronizer {
            api,
            directory,
            time_zone,
        }
    }

    /// Delete duplicates of `records` from every calendar in `calendar_names`.
    ///
    /// With `event_ids` given, each id is deleted from each named calendar.
    /// Otherwise duplicates are looked up and each is deleted from the
    /// calendar it was found in. An unknown calendar name aborts the whole
    /// operation before any delete call is made. Deletions already issued
    /// stay applied if a later one fails.
    pub async fn delete_duplicates(
        &self,
        records: &[SourceEventRecord],
        calendar_names: &[String],
        event_ids: Option<Vec<String>>,
    ) -> Result<DeleteOutcome> {
        let targets: Vec<Duplicate> = match event_ids {
            Some(ids) => {
                let mut targets = Vec::new();
                for calendar_name in calendar_names {
                    let Some(calendar_id) = self.directory.get(calendar_name) else {
                        println!("Calendar '{}' not found, no events to delete", calendar_name);
                        return Ok(DeleteOutcome::CalendarNotFound(calendar_name.clone()));
                    };
                    targets.extend(ids.iter().map(|id| Duplicate {
                        calendar_name: calendar_name.clone(),
                        calendar_id: calendar_id.to_string(),
                        event_id: id.clone(),
                    }));
                }
                targets
            }
            // the finder reports an unknown calendar itself and yields nothing
            None => DuplicateFinder::new(self.api, self.directory)
                .find_duplicates(records, calendar_names)
                .await?
                .unwrap_or_default(),
        };

        if targets.is_empty() {
            println!("No duplicate events found");
            return Ok(DeleteOutcome::NoDuplicates);
        }

        println!("Deleting duplicate events... ");
        for target in &targets {
            println!("     Deleting event id '{}'...", target.event_id);
            self.api
                .delete_event(&target.calendar_id, &target.event_id)
                .await
                .with_context(|| {
                    format!(
                        "Failed to delete event {} from '{}'",
                        target.event_id, target.calendar_name
                    )
                })?;
        }
        println!("Done");

        Ok(DeleteOutcome::Deleted(targets.len()))
    }

    /// Insert every record as an all-day event into each named calendar.
    ///
    /// Unknown calendar names are skipped and reported after the others have
    /// been loaded. Nothing here prevents duplicates; run the delete phase
    /// first.
    pub async fn upload(
        &self,
        records: &[SourceEventRecord],
        calendar_names: &[String],
    ) -> Result<UploadStats> {
        let mut stats = UploadStats::default();

        for calendar_name in calendar_names {
            let Some(calendar_id) = self.directory.get(calendar_name) else {
                stats.missing.push(calendar_name.clone());
                continue;
            };

            println!("Loading events to calendar '{}'...", calendar_name);
            for record in records {
                let event = self.all_day_event(record)?;
                self.api
                    .insert_event(calendar_id, &event)
                    .await
                    .with_context(|| format!("Failed to create event: {}", record.name))?;
                println!("     Event '{}' created on {}", record.name, record.date_key());
                stats.created += 1;
            }
            println!("Done");
        }

        for calendar_name in &stats.missing {
            println!("Calendar '{}' not found.", calendar_name);
        }

        Ok(stats)
    }

    fn all_day_event(&self, record: &SourceEventRecord) -> Result<NewEvent> {
        let end_date = record
            .date
            .checked_add_days(Days::new(1))
            .with_context(|| format!("Event date out of range: {}", record.date))?;
        let time_zone = Some(self.time_zone.name().to_string());

        Ok(NewEvent {
            summary: record.name.clone(),
            location: record.location.clone(),
            description: record.description.clone(),
            start: EventDateTime {
                date: Some(record.date),
                date_time: None,
                time_zone: time_zone.clone(),
            },
            end: EventDateTime {
                date: Some(end_date),
                date_time: None,
                time_zone,
            },
        })
    }
}

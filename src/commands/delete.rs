use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::sync::{DeleteOutcome, EventSynchronizer};

use super::{load_records, Session};

pub async fn run(cfg: &Config, events: &Path, event_ids: Vec<String>) -> Result<()> {
    let records = load_records(events)?;
    let session = Session::open(cfg).await?;

    let synchronizer = EventSynchronizer::new(&session.api, &session.directory, cfg.tz()?);
    let event_ids = (!event_ids.is_empty()).then_some(event_ids);

    let outcome = synchronizer
        .delete_duplicates(&records, &cfg.calendars, event_ids)
        .await?;
    report(&outcome);

    Ok(())
}

pub fn report(outcome: &DeleteOutcome) {
    if let DeleteOutcome::Deleted(count) = outcome {
        println!("Deleted {} event(s)", count);
    }
}

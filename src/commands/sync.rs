use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::sync::EventSynchronizer;

use super::{delete, load_records, upload, Session};

/// Delete duplicates, then upload the source events afresh.
pub async fn run(cfg: &Config, events: &Path) -> Result<()> {
    let records = load_records(events)?;
    let session = Session::open(cfg).await?;

    let synchronizer = EventSynchronizer::new(&session.api, &session.directory, cfg.tz()?);

    let outcome = synchronizer
        .delete_duplicates(&records, &cfg.calendars, None)
        .await?;
    delete::report(&outcome);

    let stats = synchronizer.upload(&records, &cfg.calendars).await?;
    upload::report(&stats);

    Ok(())
}

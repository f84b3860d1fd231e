use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::sync::{EventSynchronizer, UploadStats};

use super::{load_records, Session};

pub async fn run(cfg: &Config, events: &Path) -> Result<()> {
    let records = load_records(events)?;
    let session = Session::open(cfg).await?;

    let synchronizer = EventSynchronizer::new(&session.api, &session.directory, cfg.tz()?);
    let stats = synchronizer.upload(&records, &cfg.calendars).await?;
    report(&stats);

    Ok(())
}

pub fn report(stats: &UploadStats) {
    println!("\nCreated {} event(s)", stats.created);
}

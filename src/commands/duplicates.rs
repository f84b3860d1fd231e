use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::duplicates::DuplicateFinder;

use super::{load_records, Session};

pub async fn run(cfg: &Config, events: &Path) -> Result<()> {
    let records = load_records(events)?;
    let session = Session::open(cfg).await?;

    let finder = DuplicateFinder::new(&session.api, &session.directory);
    let Some(found) = finder.find_duplicates(&records, &cfg.calendars).await? else {
        return Ok(());
    };

    if found.is_empty() {
        println!("No duplicate events found");
        return Ok(());
    }

    for duplicate in &found {
        println!("{}\t{}", duplicate.calendar_name, duplicate.event_id);
    }
    println!("\n{} duplicate event(s)", found.len());

    Ok(())
}
